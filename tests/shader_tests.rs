use std::fs;
use std::path::Path;

fn read_shader(name: &str) -> String {
    let shader_path = Path::new("src/shaders").join(name);
    fs::read_to_string(&shader_path).expect("Failed to read shader file")
}

#[test]
fn test_shader_files_exist() {
    for name in ["scene.wgsl", "shadow.wgsl", "tonemap.wgsl"] {
        let shader_path = Path::new("src/shaders").join(name);
        assert!(shader_path.exists(), "Shader file should exist at {:?}", shader_path);
    }
}

#[test]
fn test_scene_shader() {
    let shader_content = read_shader("scene.wgsl");

    assert!(shader_content.contains("@vertex"), "Shader should contain vertex entry point");
    assert!(shader_content.contains("@fragment"), "Shader should contain fragment entry point");
    assert!(shader_content.contains("fn vs_main"));
    assert!(shader_content.contains("fn fs_main"));

    assert!(shader_content.contains("struct Globals"));
    assert!(shader_content.contains("struct MeshUniform"));
    assert!(shader_content.contains("texture_depth_2d"), "Scene shader should sample the shadow map");
    assert!(shader_content.contains("@group(1) @binding(0)"));
}

#[test]
fn test_shadow_shader() {
    let shader_content = read_shader("shadow.wgsl");

    assert!(shader_content.contains("@vertex"));
    assert!(shader_content.contains("fn vs_shadow"));
    assert!(!shader_content.contains("@fragment"), "Shadow pass is depth only");
}

#[test]
fn test_tonemap_shader() {
    let shader_content = read_shader("tonemap.wgsl");

    assert!(shader_content.contains("fn vs_main"));
    assert!(shader_content.contains("fn fs_main"));
    assert!(shader_content.contains("struct ToneMapping"));
    assert!(shader_content.contains("fn linear_to_srgb"));
}

#[test]
fn test_shared_structs_match() {
    let scene = read_shader("scene.wgsl");
    let shadow = read_shader("shadow.wgsl");

    let extract = |source: &str, name: &str| -> String {
        let start = source.find(&format!("struct {} {{", name)).expect("struct missing");
        let end = source[start..].find('}').expect("unterminated struct") + start;
        source[start..=end]
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with("//"))
            .collect::<Vec<_>>()
            .join(" ")
    };

    assert_eq!(extract(&scene, "Globals"), extract(&shadow, "Globals"));
    assert_eq!(extract(&scene, "MeshUniform"), extract(&shadow, "MeshUniform"));
}
