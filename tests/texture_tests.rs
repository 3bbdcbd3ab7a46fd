//! Texture Tests
//!
//! Tests for:
//! - Inline hex and data-URI images
//! - File lookup next to the document and under texture bases
//! - Custom TextureLoader hooks
//! - Material texture channels resolved through sampler parameters

use std::io::Cursor;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use base64::Engine as _;
use image::{ImageFormat, Rgba, RgbaImage};

use myth_dae::document::Document;
use myth_dae::scene::SceneGraph;
use myth_dae::{ColladaLoader, ImageSource, LoadOptions, Texture, TextureLoader};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn png_bytes() -> Vec<u8> {
    let img = RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 255]));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("encode png");
    bytes
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02X}")).collect()
}

/// A textured phong material applied to one triangle; `image` is the body
/// of `library_images` and must declare an image with id `skin`.
fn textured_scene(image: &str) -> String {
    init_logger();
    format!(
        r##"<COLLADA>
        <library_images>{image}</library_images>
        <library_effects>
            <effect id="fx"><profile_COMMON>
                <newparam sid="skin-surface"><surface type="2D"><init_from>skin</init_from></surface></newparam>
                <newparam sid="skin-sampler"><sampler2D><source>skin-surface</source></sampler2D></newparam>
                <technique sid="common"><phong>
                    <diffuse><texture texture="skin-sampler" texcoord="UVMap"/></diffuse>
                </phong></technique>
            </profile_COMMON></effect>
        </library_effects>
        <library_materials><material id="mat" name="Skin"><instance_effect url="#fx"/></material></library_materials>
        <library_geometries>
            <geometry id="g"><mesh>
                <source id="p"><float_array id="pa">0 0 0 1 0 0 0 1 0</float_array>
                    <technique_common><accessor source="#pa" stride="3"/></technique_common></source>
                <vertices id="v"><input semantic="POSITION" source="#p"/></vertices>
                <triangles count="1" material="skin"><input semantic="VERTEX" source="#v" offset="0"/><p>0 1 2</p></triangles>
            </mesh></geometry>
        </library_geometries>
        <library_visual_scenes><visual_scene id="s">
            <node name="body"><instance_geometry url="#g"><bind_material><technique_common>
                <instance_material symbol="skin" target="#mat"/>
            </technique_common></bind_material></instance_geometry></node>
        </visual_scene></library_visual_scenes>
        <scene><instance_visual_scene url="#s"/></scene>
        </COLLADA>"##
    )
}

fn diffuse_map(scene: &SceneGraph) -> Option<Texture> {
    let mesh = scene.meshes.values().next().expect("mesh");
    scene.material_of(mesh).expect("material").diffuse_map.clone()
}

fn scratch_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("myth-dae-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("scratch dir");
    dir
}

// ============================================================================
// Image sources
// ============================================================================

#[test]
fn inline_hex_image_is_sniffed() -> anyhow::Result<()> {
    let xml = format!(r#"<image id="img"><data>{}</data></image>"#, hex(&png_bytes()));
    let doc = Document::parse_str(&xml)?;
    let source = ImageSource::from_image(&doc.root()).expect("source");
    assert_eq!(source.format(), Some(ImageFormat::Png));
    assert!(matches!(source, ImageSource::Inline { .. }));
    Ok(())
}

#[test]
fn init_from_file_url_is_decoded() -> anyhow::Result<()> {
    let doc = Document::parse_str(r#"<image id="img"><init_from>file://maps/old%20brick.jpg</init_from></image>"#)?;
    let source = ImageSource::from_image(&doc.root()).expect("source");
    assert_eq!(source, ImageSource::Path("maps/old brick.jpg".to_string()));
    assert_eq!(source.format(), Some(ImageFormat::Jpeg));
    Ok(())
}

#[test]
fn image_without_data_has_no_source() -> anyhow::Result<()> {
    let doc = Document::parse_str(r#"<image id="img"><init_from></init_from></image>"#)?;
    assert!(ImageSource::from_image(&doc.root()).is_none());
    Ok(())
}

// ============================================================================
// Material channels
// ============================================================================

#[test]
fn inline_image_reaches_diffuse_map() -> anyhow::Result<()> {
    let image = format!(r#"<image id="skin"><data>{}</data></image>"#, hex(&png_bytes()));
    let scene = ColladaLoader::default().load_str(&textured_scene(&image))?;
    let texture = diffuse_map(&scene).expect("diffuse map");
    assert_eq!(texture.name, "skin");
    assert_eq!((texture.width, texture.height), (2, 2));
    assert_eq!(texture.data.len(), 16);
    assert_eq!(texture.data[..4], [10, 20, 30, 255]);
    Ok(())
}

#[test]
fn data_uri_image_is_decoded() -> anyhow::Result<()> {
    let encoded = base64::engine::general_purpose::STANDARD.encode(png_bytes());
    let image = format!(r#"<image id="skin"><init_from>data:image/png;base64,{encoded}</init_from></image>"#);
    let scene = ColladaLoader::default().load_str(&textured_scene(&image))?;
    let texture = diffuse_map(&scene).expect("diffuse map");
    assert_eq!(texture.format, Some(ImageFormat::Png));
    assert_eq!(texture.width, 2);
    Ok(())
}

#[test]
fn missing_file_leaves_channel_empty() -> anyhow::Result<()> {
    let image = r#"<image id="skin"><init_from>does/not/exist.png</init_from></image>"#;
    let scene = ColladaLoader::default().load_str(&textured_scene(image))?;
    assert!(diffuse_map(&scene).is_none());
    assert_eq!(scene.materials.len(), 1);
    Ok(())
}

// ============================================================================
// File lookup
// ============================================================================

#[test]
fn file_next_to_document_is_found() -> anyhow::Result<()> {
    let dir = scratch_dir();
    std::fs::write(dir.join("skin.png"), png_bytes())?;
    let image = r#"<image id="skin"><init_from>C:/artist/textures/skin.png</init_from></image>"#;
    let document = dir.join("model.dae");
    std::fs::write(&document, textured_scene(image))?;

    let scene = ColladaLoader::default().load_file(&document)?;
    let texture = diffuse_map(&scene).expect("diffuse map");
    assert_eq!(texture.path.as_deref(), Some(dir.join("skin.png").as_path()));

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}

#[test]
fn texture_base_is_searched_last() -> anyhow::Result<()> {
    let dir = scratch_dir();
    std::fs::write(dir.join("skin.png"), png_bytes())?;
    let image = r#"<image id="skin"><init_from>textures/skin.png</init_from></image>"#;

    let options = LoadOptions::default().with_texture_base(&dir);
    let scene = ColladaLoader::new(options).load_str(&textured_scene(image))?;
    let texture = diffuse_map(&scene).expect("diffuse map");
    assert_eq!(texture.width, 2);

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}

// ============================================================================
// Custom loaders
// ============================================================================

#[derive(Clone, Default)]
struct RecordingLoader {
    seen: Arc<Mutex<Vec<Vec<PathBuf>>>>,
}

impl TextureLoader for RecordingLoader {
    fn load(&self, source: &ImageSource, candidates: &[PathBuf]) -> Option<Texture> {
        self.seen.lock().ok()?.push(candidates.to_vec());
        let ImageSource::Path(path) = source else {
            return None;
        };
        Some(Texture {
            name: path.clone(),
            path: candidates.first().cloned(),
            format: None,
            width: 1,
            height: 1,
            data: Arc::new(vec![255; 4]),
        })
    }
}

#[test]
fn custom_loader_receives_candidates() -> anyhow::Result<()> {
    let recorder = RecordingLoader::default();
    let options = LoadOptions::default().with_texture_base("/library");
    let loader = ColladaLoader::new(options).with_texture_loader(recorder.clone());

    let image = r#"<image id="skin"><init_from>maps\skin.tga</init_from></image>"#;
    let scene = loader.load_str(&textured_scene(image))?;

    let seen = recorder.seen.lock().expect("lock");
    assert_eq!(seen.len(), 1);
    assert_eq!(
        seen[0],
        [
            PathBuf::from("maps/skin.tga"),
            PathBuf::from("skin.tga"),
            PathBuf::from("/library/skin.tga"),
        ]
    );

    let texture = diffuse_map(&scene).expect("diffuse map");
    assert_eq!(texture.name, "skin");
    assert_eq!(texture.width, 1);
    Ok(())
}
