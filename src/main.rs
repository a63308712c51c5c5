use base64::{engine::general_purpose, Engine as _};
use imagegen::{
    logger::{self, LogLevel, LoggerConfig},
    AIConfig, GeneratedFile, ImageConfig, Route,
};
use std::env;
use std::fs;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();

    let level = env::var("LOG_LEVEL")
        .ok()
        .and_then(|name| LogLevel::parse(&name))
        .unwrap_or(LogLevel::Info);
    logger::init_with_config(LoggerConfig::development().with_level(level))?;

    if dotenv_loaded {
        log::info!("✅ .env file loaded");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }

    let prompt = env::args().skip(1).collect::<Vec<_>>().join(" ");
    if prompt.trim().is_empty() {
        eprintln!("usage: imagegen <prompt...>");
        std::process::exit(2);
    }

    let config = AIConfig::from_env();
    logger::log_config_info(&config);

    let mut input = ImageConfig::new(prompt);
    if let Ok(system) = env::var("IMAGE_SYSTEM_PROMPT") {
        input = input.with_system_prompt(system);
    }
    if let Ok(ratio) = env::var("IMAGE_ASPECT_RATIO") {
        input = input.with_aspect_ratio(ratio);
    }
    if let Ok(size) = env::var("IMAGE_SIZE") {
        input = input.with_size(size);
    }
    if let Ok(paths) = env::var("IMAGE_REFERENCES") {
        let mut references = Vec::new();
        for path in paths.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            references.push(general_purpose::STANDARD.encode(fs::read(path)?));
        }
        input = input.with_reference_images(references);
    }

    let output = match imagegen::generate_image(&input, &config).await {
        Ok(output) => output,
        Err(e) => {
            log::error!("❌ Image generation failed: {}", e);
            return Err(e.into());
        }
    };

    // The image route answers with a bare payload; the text route only with
    // data URIs or free text.
    let (media_type, payload) = match GeneratedFile::from_data_uri(&output) {
        Some(file) => (file.media_type, file.base64),
        None if Route::for_model(&config.model) == Route::Image => {
            ("image/png".to_string(), output.clone())
        }
        None => {
            log::warn!("⚠️  Model did not return an image, printing its reply");
            println!("{}", output);
            return Ok(());
        }
    };

    match general_purpose::STANDARD.decode(payload.trim()) {
        Ok(bytes) => {
            let extension = media_type
                .strip_prefix("image/")
                .unwrap_or("png")
                .replace("jpeg", "jpg");
            let filename = format!(
                "generated_image_{}.{}",
                chrono::Utc::now().timestamp(),
                extension
            );
            fs::write(&filename, bytes)?;
            log::info!("💾 Image saved to: {}", filename);
        }
        Err(e) => {
            log::error!("❌ Returned payload is not valid base64: {}", e);
            println!("{}", output);
        }
    }

    Ok(())
}
