use std::io::Cursor;

use stripforge::{AssetStore, StripError};

fn temp_dir(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "stripforge_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

fn write_image(path: &std::path::Path, format: image::ImageFormat, px: [u8; 4]) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let img = image::RgbaImage::from_pixel(2, 3, image::Rgba(px));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), format)
        .unwrap();
    std::fs::write(path, &buf).unwrap();
}

#[test]
fn load_keys_resolves_extensionless_keys() {
    let tmp = temp_dir("load_keys");
    write_image(
        &tmp.join("balloon").join("upperleftcorner.gif"),
        image::ImageFormat::Gif,
        [0, 0, 0, 255],
    );
    write_image(
        &tmp.join("backgrounds").join("park.png"),
        image::ImageFormat::Png,
        [10, 200, 10, 255],
    );
    write_image(
        &tmp.join("dialog-left"),
        image::ImageFormat::Png,
        [1, 2, 3, 255],
    );

    let store = AssetStore::load_keys(
        &tmp,
        ["balloon/upperleftcorner", "backgrounds/park", "dialog-left", "backgrounds/park"],
    )
    .unwrap();

    assert_eq!(store.len(), 3);
    assert_eq!(store.get("backgrounds/park").unwrap().dimensions(), (2, 3));
    assert_eq!(
        store.get("backgrounds/park").unwrap().get_pixel(1, 2).0,
        [10, 200, 10, 255]
    );
    assert_eq!(
        store.get("balloon/upperleftcorner").unwrap().get_pixel(0, 0).0,
        [0, 0, 0, 255]
    );
    assert_eq!(store.get("dialog-left").unwrap().get_pixel(0, 0).0, [1, 2, 3, 255]);

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn load_keys_reports_missing_and_rejects_traversal() {
    let tmp = temp_dir("load_keys_missing");
    std::fs::create_dir_all(&tmp).unwrap();

    let err = AssetStore::load_keys(&tmp, ["thought-right"]).unwrap_err();
    assert!(matches!(err, StripError::MissingAsset { ref key } if key == "thought-right"));

    let err = AssetStore::load_keys(&tmp, ["../outside"]).unwrap_err();
    assert!(matches!(err, StripError::Validation(_)));

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn load_keys_surfaces_decode_failures() {
    let tmp = temp_dir("load_keys_corrupt");
    std::fs::create_dir_all(&tmp).unwrap();
    std::fs::write(tmp.join("broken.png"), b"nope").unwrap();

    let err = AssetStore::load_keys(&tmp, ["broken"]).unwrap_err();
    assert!(err.to_string().contains("decode asset"));

    std::fs::remove_dir_all(&tmp).ok();
}
