//! # Carousel CLI
//!
//! Usage:
//!   carousel render deck.json -o deck.pdf
//!   carousel render deck.json -o slide.png --format png --scale 0.25
//!   carousel fit --text "Hello world" --width 960 --height 400 --min 24 --max 72
//!   carousel example > deck.json

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};

use carousel::font::{FontContext, FontRegistry};
use carousel::model::TextConstraints;
use carousel::text::fit::{AutoFit, FitBox, MaxLinesPolicy};
use carousel::text::FontSpec;

#[derive(Parser)]
#[command(name = "carousel", version, about = "Auto-fit carousel slide renderer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Png,
    Pdf,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a job to PNG slides or a PDF
    Render {
        /// Input job JSON (reads stdin when omitted)
        input: Option<PathBuf>,

        /// Output file; PNG output writes <stem>-<n>.png per slide
        #[arg(short, long, default_value = "carousel.pdf")]
        output: PathBuf,

        #[arg(short, long, value_enum, default_value = "pdf")]
        format: Format,

        /// Override the job's output scale
        #[arg(long)]
        scale: Option<f64>,

        /// Treat max_lines as a hard limit
        #[arg(long)]
        enforce_max_lines: bool,
    },
    /// Print the fitted font size for a piece of text as JSON
    Fit {
        #[arg(long)]
        text: String,
        #[arg(long)]
        width: f64,
        #[arg(long)]
        height: f64,
        #[arg(long)]
        min: u32,
        #[arg(long)]
        max: u32,
        #[arg(long)]
        max_lines: Option<u32>,
        #[arg(long, default_value_t = 1.2)]
        line_height: f64,
        #[arg(long, default_value = "Helvetica")]
        font: String,
        #[arg(long, default_value_t = 400)]
        weight: u32,
        /// TrueType/OpenType file to measure with, registered as --font/--weight
        #[arg(long)]
        font_file: Option<PathBuf>,
        #[arg(long)]
        enforce_max_lines: bool,
    },
    /// Print an example job
    Example,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Render {
            input,
            output,
            format,
            scale,
            enforce_max_lines,
        } => render(input.as_deref(), &output, format, scale, enforce_max_lines),
        Commands::Fit {
            text,
            width,
            height,
            min,
            max,
            max_lines,
            line_height,
            font,
            weight,
            font_file,
            enforce_max_lines,
        } => {
            let constraints = TextConstraints {
                max_font: max,
                min_font: min,
                max_lines,
            };
            let policy = if enforce_max_lines {
                MaxLinesPolicy::Enforce
            } else {
                MaxLinesPolicy::Advisory
            };
            fit(
                &text,
                &constraints,
                FitBox { width, height },
                &FontSpec::new(&font, weight, max as f64),
                line_height,
                font_file.as_deref(),
                policy,
            )
        }
        Commands::Example => {
            print!("{}", example_job_json());
            Ok(())
        }
    };

    if let Err(message) = outcome {
        eprintln!("✗ {}", message);
        std::process::exit(1);
    }
}

fn render(
    input: Option<&Path>,
    output: &Path,
    format: Format,
    scale: Option<f64>,
    enforce_max_lines: bool,
) -> Result<(), String> {
    let json = match input {
        Some(path) => fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| format!("Failed to read stdin: {}", e))?;
            buf
        }
    };

    let mut job = carousel::parse_job(&json).map_err(|e| e.to_string())?;
    if let Some(scale) = scale {
        job.options.scale = scale;
    }
    if enforce_max_lines {
        job.options.max_lines_policy = MaxLinesPolicy::Enforce;
    }
    let registry = Arc::new(FontRegistry::new());

    match format {
        Format::Pdf => {
            let pdf = carousel::render_pdf(&job, registry).map_err(|e| e.to_string())?;
            write_file(output, &pdf)
        }
        Format::Png => {
            let slides = carousel::render_slides(&job, registry).map_err(|e| e.to_string())?;
            let stem = output
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("slide");
            for (i, png) in slides.iter().enumerate() {
                write_file(&output.with_file_name(format!("{}-{}.png", stem, i + 1)), png)?;
            }
            Ok(())
        }
    }
}

fn fit(
    text: &str,
    constraints: &TextConstraints,
    bounds: FitBox,
    font: &FontSpec,
    line_height: f64,
    font_file: Option<&Path>,
    policy: MaxLinesPolicy,
) -> Result<(), String> {
    let ctx = FontContext::new();
    if let Some(path) = font_file {
        let data = fs::read(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        ctx.registry()
            .register(&font.family, font.weight, data)
            .map_err(|e| e.to_string())?;
    }

    let result = AutoFit::new(&ctx)
        .with_policy(policy)
        .solve(text, constraints, bounds, font, line_height)
        .map_err(|e| e.to_string())?;
    let json = serde_json::to_string(&result).map_err(|e| e.to_string())?;
    println!("{}", json);
    Ok(())
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), String> {
    fs::write(path, bytes).map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
    eprintln!("✓ Written {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

fn example_job_json() -> &'static str {
    r##"{
  "slides": [
    {
      "blueprint": {
        "layers": [
          { "type": "background" },
          {
            "type": "text_box",
            "id": "headline",
            "position": { "x": 60, "y": 120, "width": 960, "height": 420 },
            "constraints": { "max_font": 96, "min_font": 40, "max_lines": 3 }
          },
          {
            "type": "text_box",
            "id": "body",
            "position": { "x": 60, "y": 600, "width": 960, "height": 600 },
            "constraints": { "max_font": 44, "min_font": 24 },
            "bulletStyle": "disc"
          },
          {
            "type": "text_box",
            "id": "footer",
            "position": { "x": 60, "y": 1250, "width": 960, "height": 60 },
            "constraints": { "max_font": 28, "min_font": 18 },
            "align": "right"
          }
        ]
      },
      "content": {
        "headline": "Five habits of teams that ship every week",
        "body": [
          "Small pull requests, reviewed the same day",
          "One shared definition of done",
          "Demos instead of status meetings"
        ],
        "footer": "swipe →"
      }
    },
    {
      "blueprint": {
        "layers": [
          { "type": "background" },
          {
            "type": "text_box",
            "id": "headline",
            "position": { "x": 60, "y": 400, "width": 960, "height": 500 },
            "constraints": { "max_font": 120, "min_font": 48 },
            "align": "center"
          }
        ]
      },
      "content": { "headline": "Follow for more" }
    }
  ],
  "styleKit": {
    "typography": {
      "headlineFont": "Helvetica",
      "headlineWeight": 700,
      "bodyFont": "Helvetica",
      "bodyWeight": 400
    },
    "colors": { "background": "#0f172a", "foreground": "#f8fafc", "accent": "#38bdf8" },
    "spacingRules": { "padding": 60, "lineHeight": 1.2 }
  },
  "brandKit": { "colors": { "accent": "#f97316" } },
  "fonts": [],
  "options": {
    "scale": 1.0,
    "maxLinesPolicy": "advisory",
    "metadata": { "title": "Ship every week", "author": "Carousel" }
  }
}
"##
}
