// Render hook and body overlays to PNG files for a quick visual check

use std::path::PathBuf;
use std::sync::Arc;

use bilingual_reels::{
    config::Config,
    overlay::{FontBook, OverlayRenderer},
    speech::Language,
    text::TextShaper,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut args = std::env::args().skip(1);
    let hook = args.next().unwrap_or_else(|| "BITCOIN HITS SEVENTY THOUSAND!".to_string());
    let body = args.next().unwrap_or_else(|| {
        "\u{0645}\u{0631}\u{062D}\u{0628}\u{0627} \u{0628}\u{0627}\u{0644}\u{0639}\u{0627}\u{0644}\u{0645} 2024".to_string()
    });
    let out_dir = args.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));

    println!("🖼️  Previewing overlays");

    let config = Config::default();
    let fonts = FontBook::load(&config.render.extra_font_paths);
    for language in [Language::English, Language::Arabic] {
        println!(
            "   {} fonts: {}",
            language,
            fonts.chain(language).len()
        );
    }

    let renderer = OverlayRenderer::new(Arc::new(fonts), config.render.clone());

    let shaped = TextShaper::new().shape(&body);
    println!("\n   Logical body: {}", body);
    println!("   Shaped body:  {}", shaped);

    for (name, text, language) in [("hook", hook.as_str(), Language::English), ("body", shaped.as_str(), Language::Arabic)] {
        let path = out_dir.join(format!("preview_{}.png", name));
        let asset = renderer.render_to_file(text, language, renderer.style_for(language), &path)?;
        println!("   ✅ {} -> {} ({}x{})", name, asset.path.display(), asset.width, asset.height);
    }

    Ok(())
}
