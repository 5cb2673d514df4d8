use clap::{Parser, Subcommand};
use iiif_image::imaging::{self, RustBackend};
use iiif_image::{config, info, request};
use std::path::PathBuf;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup — trivial, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "iiif-image")]
#[command(about = "IIIF Image API request translator")]
#[command(long_about = "\
IIIF Image API request translator

Parses IIIF Image API request paths and executes them against a directory
of source images. The request syntax is:

  /{identifier}/{region}/{size}/{rotation}/{quality}.{format}
  /{identifier}/info.json

  region:   full | pct:x,y,w,h | x,y,w,h
  size:     full | pct:n | w, | ,h | w,h | !w,h
  rotation: n | !n          (0, 90, 180, or 270; ! mirrors first)
  quality:  default | color (gray and bitonal are rejected as unimplemented)
  format:   jpg | png | tif | gif (anything else encodes as jpg)

A request whose parameters are all identity values is served as the
original file bytes without re-encoding.

An optional TOML config supplies the URL prefix to strip from request
paths and the base URL used for the info document's @id:

  prefix = \"/iiif\"
  base_url = \"https://images.example.org\"")]
#[command(version = version_string())]
struct Cli {
    /// Directory containing the source images
    #[arg(long, default_value = "images", global = true)]
    source_dir: PathBuf,

    /// TOML config file with `prefix` and `base_url`
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Execute a request path and write the derivative (or info JSON)
    Transform {
        /// Request path, e.g. /photo.jpg/full/!400,400/0/default.jpg
        request_path: String,
        /// Output file; defaults to derivative.{format}
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print the info.json document for an identifier
    Info { identifier: String },
    /// Parse a request path and print the descriptor without rendering
    Check { request_path: String },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cfg = match &cli.config {
        Some(path) => config::ServiceConfig::load(path)?,
        None => config::ServiceConfig::default(),
    };

    match cli.command {
        Command::Transform { request_path, out } => {
            let remainder = cfg.strip_prefix(&request_path).ok_or_else(|| {
                format!("request path is not under the configured prefix '{}'", cfg.prefix)
            })?;
            let descriptor = request::parse(remainder)?;
            let source = cli.source_dir.join(&descriptor.identifier);

            if descriptor.info {
                let backend = RustBackend::new();
                let dims = imaging::source_dimensions(&backend, &source)?;
                let doc = info::build_info(
                    dims.width,
                    dims.height,
                    &cfg.image_id(&descriptor.identifier),
                );
                println!("{}", serde_json::to_string_pretty(&doc)?);
                return Ok(());
            }

            let bytes = if descriptor.is_unmodified() {
                std::fs::read(&source)?
            } else {
                imaging::render(&RustBackend::new(), &source, &descriptor)?
            };

            let out_path = out.unwrap_or_else(|| {
                PathBuf::from(format!("derivative.{}", descriptor.format))
            });
            std::fs::write(&out_path, &bytes)?;
            println!("wrote {} bytes to {}", bytes.len(), out_path.display());
        }
        Command::Info { identifier } => {
            let source = cli.source_dir.join(&identifier);
            let backend = RustBackend::new();
            let dims = imaging::source_dimensions(&backend, &source)?;
            let doc = info::build_info(dims.width, dims.height, &cfg.image_id(&identifier));
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        Command::Check { request_path } => {
            let remainder = cfg.strip_prefix(&request_path).ok_or_else(|| {
                format!("request path is not under the configured prefix '{}'", cfg.prefix)
            })?;
            let descriptor = request::parse(remainder)?;
            println!("{}", serde_json::to_string_pretty(&descriptor)?);
            if descriptor.is_unmodified() {
                println!("pass-through: request leaves the source unmodified");
            }
        }
    }

    Ok(())
}
