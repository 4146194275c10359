use anyhow::Result;
use clap::{Parser, Subcommand};
use poem_art_generator::app::{format_optimization, App, ArticleOutput};
use poem_art_generator::config::Config;
use poem_art_generator::models::{Style, POPULAR_POEMS};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "poem-art-generator")]
#[command(about = "Generate articles, paintings and painting prompts for classical poems")]
struct CliArgs {
    /// Verbose logging.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate an article about a poem.
    Article {
        poem_name: String,
        /// Write the article to this file.
        #[arg(short, long, conflicts_with = "output_dir")]
        output: Option<PathBuf>,
        /// Write the article into this directory, named after the poem.
        #[arg(short = 'd', long)]
        output_dir: Option<PathBuf>,
    },
    /// Print the image prompt composed for a poem.
    ImagePrompt {
        poem_name: String,
        #[arg(short, long, default_value = "")]
        content: String,
        #[arg(short, long, default_value = "ink-wash")]
        style: String,
    },
    /// Generate and download an image for a poem.
    Image {
        poem_name: String,
        #[arg(short, long, default_value = "")]
        content: String,
        #[arg(short, long, default_value = "ink-wash")]
        style: String,
        /// Only print the image URL.
        #[arg(long)]
        no_save: bool,
        /// Save the image here instead of the configured image directory.
        #[arg(short = 'd', long)]
        output_dir: Option<PathBuf>,
    },
    /// Optimize a painting prompt.
    Optimize {
        prompt: String,
        #[arg(short, long, default_value = "ink-wash")]
        style: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Optimize several prompts; prints JSON.
    BatchOptimize {
        #[arg(required = true)]
        prompts: Vec<String>,
        #[arg(short, long, default_value = "ink-wash")]
        style: String,
    },
    /// Optimize one poem's content across several styles; prints JSON.
    StyleVariants {
        content: String,
        /// Styles to try (defaults to ink-wash, fine-brush, oil-painting, sketch, printmaking).
        #[arg(short, long = "style")]
        styles: Vec<String>,
    },
    /// Delete generated images older than the given number of days.
    Cleanup {
        #[arg(long, default_value_t = 30)]
        days: u32,
        /// Clean this directory instead of the configured image directory.
        #[arg(short = 'd', long)]
        output_dir: Option<PathBuf>,
    },
    /// List well-known poems to try.
    Poems,
    /// List supported styles.
    Styles,
    /// Show the resolved configuration.
    Config,
}

fn init_tracing(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("poem_art_generator={}", default_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

const DEFAULT_VARIANT_STYLES: [Style; 5] = [
    Style::InkWash,
    Style::FineBrush,
    Style::OilPainting,
    Style::Sketch,
    Style::Printmaking,
];

fn parse_styles(tags: &[String]) -> poem_art_generator::Result<Vec<Style>> {
    if tags.is_empty() {
        return Ok(DEFAULT_VARIANT_STYLES.to_vec());
    }
    tags.iter().map(|tag| tag.parse()).collect()
}

async fn run(command: Command, config: Config) -> poem_art_generator::Result<()> {
    match command {
        Command::Styles => {
            for style in Style::ALL {
                println!("{:<14} {:<6} {}", style.slug(), style.display_name(), style.description());
            }
            Ok(())
        }
        Command::Poems => {
            for (i, poem) in POPULAR_POEMS.iter().enumerate() {
                println!("{:2}. {}", i + 1, poem);
            }
            Ok(())
        }
        Command::Config => {
            println!("API key:            {}", config.masked_api_key());
            println!("API base URL:       {}", config.api_base_url);
            println!("API timeout:        {}s", config.api_timeout.as_secs());
            println!("Chat model:         {}", config.chat_model);
            println!("Image model:        {}", config.image_model);
            println!("Optimization model: {}", config.optimize_model);
            println!("Image size/quality: {} / {}", config.image_size, config.image_quality);
            println!("Output directory:   {}", config.output_dir.display());
            println!("Image directory:    {}", config.image_output_dir.display());
            Ok(())
        }
        Command::ImagePrompt {
            poem_name,
            content,
            style,
        } => {
            let app = App::from_config(&config)?;
            let request = app
                .images
                .create_image_request(&poem_name, &content, &style)
                .await?;
            println!("{}", request.derived_prompt);
            Ok(())
        }
        Command::Article {
            poem_name,
            output,
            output_dir,
        } => {
            let app = App::from_config(&config)?;
            let target = match (output, output_dir) {
                (Some(path), _) => ArticleOutput::File(path),
                (None, Some(dir)) => ArticleOutput::Directory(dir),
                (None, None) => ArticleOutput::Stdout,
            };
            let (article, saved) = app.write_article(&poem_name, &target).await?;
            match saved {
                Some(path) => println!("Article saved to {}", path.display()),
                None => println!("{}", article.content),
            }
            Ok(())
        }
        Command::Image {
            poem_name,
            content,
            style,
            no_save,
            output_dir,
        } => {
            let app = App::from_config(&config.with_image_output_dir(output_dir))?;
            let image = app
                .create_poem_image(&poem_name, &content, &style, !no_save)
                .await?;
            println!("Image URL: {}", image.source_url);
            if let Some(path) = image.local_path {
                println!("Saved to:  {}", path.display());
            }
            Ok(())
        }
        Command::Optimize {
            prompt,
            style,
            output,
        } => {
            let app = App::from_config(&config)?;
            let optimization = app.optimizer.optimize_prompt(&prompt, &style).await?;
            match output {
                Some(path) => {
                    app.save_optimization(&optimization, &path).await?;
                    println!("Optimized prompt saved to {}", path.display());
                }
                None => print!("{}", format_optimization(&optimization)),
            }
            Ok(())
        }
        Command::BatchOptimize { prompts, style } => {
            let app = App::from_config(&config)?;
            let results = app.optimizer.batch_optimize(&prompts, &style).await?;
            println!("{}", serde_json::to_string_pretty(&results)?);
            Ok(())
        }
        Command::StyleVariants { content, styles } => {
            let styles = parse_styles(&styles)?;
            let app = App::from_config(&config)?;
            let results = app.optimizer.style_variants(&content, &styles).await;
            println!("{}", serde_json::to_string_pretty(&results)?);
            Ok(())
        }
        Command::Cleanup { days, output_dir } => {
            let app = App::from_config(&config.with_image_output_dir(output_dir))?;
            let deleted = app.images.cleanup_old_images(days).await;
            println!(
                "Deleted {} image(s) older than {} day(s) from {}",
                deleted,
                days,
                app.images.output_dir().display()
            );
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(args.verbose, args.quiet);

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(e.exit_code());
        }
    };

    match run(args.command, config).await {
        Ok(()) => {
            info!("Done");
            Ok(())
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_batch_optimize_args() {
        let args = CliArgs::try_parse_from([
            "poem-art-generator",
            "batch-optimize",
            "山水",
            "花鸟",
            "--style",
            "oil-painting",
        ])
        .unwrap();

        match args.command {
            Command::BatchOptimize { prompts, style } => {
                assert_eq!(prompts, vec!["山水", "花鸟"]);
                assert_eq!(style, "oil-painting");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_article_output_flags_conflict() {
        let err = CliArgs::try_parse_from([
            "poem-art-generator",
            "article",
            "静夜思",
            "--output",
            "a.md",
            "--output-dir",
            "out",
        ]);
        assert!(err.is_err());
    }

    #[test]
    fn test_cleanup_defaults_to_thirty_days() {
        let args = CliArgs::try_parse_from(["poem-art-generator", "cleanup"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Cleanup {
                days: 30,
                output_dir: None
            }
        ));
    }

    #[test]
    fn test_image_and_cleanup_accept_output_dir() {
        let args = CliArgs::try_parse_from([
            "poem-art-generator",
            "image",
            "静夜思",
            "--style",
            "sketch",
            "-d",
            "paintings",
        ])
        .unwrap();
        match args.command {
            Command::Image { output_dir, no_save, .. } => {
                assert_eq!(output_dir, Some(PathBuf::from("paintings")));
                assert!(!no_save);
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let args = CliArgs::try_parse_from([
            "poem-art-generator",
            "cleanup",
            "--days",
            "7",
            "--output-dir",
            "/tmp/paintings",
        ])
        .unwrap();
        match args.command {
            Command::Cleanup { days, output_dir } => {
                assert_eq!(days, 7);
                assert_eq!(output_dir, Some(PathBuf::from("/tmp/paintings")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_poems_command_parses() {
        let args = CliArgs::try_parse_from(["poem-art-generator", "poems"]).unwrap();
        assert!(matches!(args.command, Command::Poems));
    }

    #[tokio::test]
    async fn test_cleanup_runs_without_api_key() {
        let dir = tempfile::tempdir().unwrap();
        let stale = dir.path().join("old.png");
        std::fs::write(&stale, b"png").unwrap();
        std::fs::File::options()
            .write(true)
            .open(&stale)
            .unwrap()
            .set_modified(std::time::SystemTime::now() - std::time::Duration::from_secs(60 * 24 * 60 * 60))
            .unwrap();

        let config = Config::from_lookup(|_| None).unwrap();
        run(
            Command::Cleanup {
                days: 30,
                output_dir: Some(dir.path().to_path_buf()),
            },
            config,
        )
        .await
        .unwrap();

        assert!(!stale.exists());
    }

    #[test]
    fn test_parse_styles() {
        assert_eq!(parse_styles(&[]).unwrap(), DEFAULT_VARIANT_STYLES.to_vec());
        assert_eq!(
            parse_styles(&["sketch".to_string(), "油画".to_string()]).unwrap(),
            vec![Style::Sketch, Style::OilPainting]
        );
        assert!(parse_styles(&["nope".to_string()]).is_err());
    }
}
