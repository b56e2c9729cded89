use super::*;
use crate::config::GeneratorSettings;

fn settings(urls: &[&str]) -> GeneratorSettings {
    GeneratorSettings {
        delay_ms: 0,
        sample_urls: urls.iter().map(|s| s.to_string()).collect(),
        ..GeneratorSettings::default()
    }
}

#[test]
fn quick_mode_uses_numbered_title_and_default_genre() {
    let generator = SimulatedGenerator::new(&settings(&["file:///tmp/a.wav"]));
    let options = GenerateOptions {
        existing: 2,
        ..GenerateOptions::default()
    };

    let t = generator.generate("a calm piano piece", &options).unwrap();
    assert_eq!(t.title, "AI Song 3");
    assert_eq!(t.genre, "Electronic");
    assert_eq!(t.artist, "AI Generated • Electronic");
    assert_eq!(t.url, "file:///tmp/a.wav");
    assert_eq!(t.lyrics, None);
}

#[test]
fn custom_mode_keeps_title_tags_and_lyrics() {
    let generator = SimulatedGenerator::new(&settings(&["file:///tmp/a.wav"]));
    let options = GenerateOptions {
        title: Some("  Neon Rain ".into()),
        tags: Some("synthwave".into()),
        custom: true,
        existing: 0,
    };

    let t = generator.generate("verse one\nchorus", &options).unwrap();
    assert_eq!(t.title, "Neon Rain");
    assert_eq!(t.genre, "synthwave");
    assert_eq!(t.artist, "AI Generated • synthwave");
    assert_eq!(t.lyrics(), Some("verse one\nchorus"));
}

#[test]
fn blank_title_and_tags_fall_back_to_defaults() {
    let generator = SimulatedGenerator::new(&settings(&["file:///tmp/a.wav"]));
    let options = GenerateOptions {
        title: Some("   ".into()),
        tags: Some("".into()),
        custom: true,
        existing: 0,
    };

    let t = generator.generate("words", &options).unwrap();
    assert_eq!(t.title, "AI Song 1");
    assert_eq!(t.genre, "Electronic");
}

#[test]
fn url_is_drawn_from_the_pool() {
    let pool = ["file:///tmp/a.wav", "file:///tmp/b.wav", "file:///tmp/c.wav"];
    let generator = SimulatedGenerator::new(&settings(&pool));

    for _ in 0..20 {
        let t = generator.generate("x", &GenerateOptions::default()).unwrap();
        assert!(pool.contains(&t.url.as_str()));
    }
}

#[test]
fn ids_are_unique() {
    let generator = SimulatedGenerator::new(&settings(&["file:///tmp/a.wav"]));
    let a = generator.generate("x", &GenerateOptions::default()).unwrap();
    let b = generator.generate("x", &GenerateOptions::default()).unwrap();
    assert_ne!(a.id, b.id);
}

#[test]
fn empty_pool_is_an_error() {
    let generator = SimulatedGenerator::new(&settings(&[]));
    assert_eq!(
        generator.generate("x", &GenerateOptions::default()),
        Err(GenerationError::NoSamples)
    );
}

#[test]
fn sample_dir_replaces_configured_urls_when_non_empty() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("one.wav"), b"x").unwrap();

    let mut s = settings(&["https://example.invalid/remote.wav"]);
    s.sample_dir = Some(dir.path().to_path_buf());
    let generator = SimulatedGenerator::new(&s);
    assert_eq!(
        generator.pool(),
        &[format!("file://{}", dir.path().join("one.wav").display())]
    );

    let empty = tempfile::tempdir().unwrap();
    s.sample_dir = Some(empty.path().to_path_buf());
    let generator = SimulatedGenerator::new(&s);
    assert_eq!(generator.pool(), &["https://example.invalid/remote.wav".to_string()]);
}
