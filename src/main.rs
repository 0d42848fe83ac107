use bird_concern::{cli, config, context, error, export, form, report};
use bird_concern_common::FilterSpec;
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use context::AppContext;
use error::Result;

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_context(cli: &Cli, config: &Config) -> Result<AppContext> {
    let paths = config.resolve_paths(
        cli.dataset.as_deref(),
        cli.model.as_deref(),
        cli.encoder.as_deref(),
    )?;
    AppContext::load(&paths, config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = Config::load()?;

    match &cli.command {
        Commands::Predict { traits, interactive, show_probabilities } => {
            println!("🐦 bird-concern - 保全懸念度予測\n");

            println!("[1/2] データセットとモデルを読み込み中...");
            let ctx = load_context(&cli, &config)?;
            println!("✔ {}件のレコードを読み込み\n", ctx.table().len());

            let form = if *interactive {
                form::collect_interactive(ctx.table())?
            } else {
                form::from_args(ctx.table(), traits)?
            };
            let input = form.collect();

            println!("[2/2] 予測中...");
            let prediction = ctx.predict(&input)?;
            report::print_prediction(prediction.tier);

            if *show_probabilities {
                match ctx.probabilities(&input)? {
                    Some(probs) => report::print_probabilities(&probs),
                    None => println!("（このモデルは確率出力に対応していません）"),
                }
            }
        }

        Commands::Summary { group, migratory, state, output, format } => {
            println!("📊 bird-concern - 集計\n");

            println!("[1/2] データセットとモデルを読み込み中...");
            let ctx = load_context(&cli, &config)?;
            println!("✔ {}件のレコードを読み込み\n", ctx.table().len());

            let spec = FilterSpec {
                groups: group.clone(),
                migratory: migratory.clone(),
                states: state.clone(),
            };

            println!("[2/2] 集計中...\n");
            let views = ctx.summarize(&spec)?;
            for view in &views {
                report::print_panel(view);
            }

            if let Some(dir) = output {
                export::export_panels(&views, format, dir)?;
                println!("\n✅ エクスポート完了");
            }
        }

        Commands::Columns { unique } => {
            let ctx = load_context(&cli, &config)?;
            match unique {
                Some(column) => {
                    for value in ctx.table().unique(column)? {
                        println!("{}", value);
                    }
                }
                None => {
                    println!("州列 ({}件):", ctx.table().state_columns().len());
                    for column in ctx.table().state_columns() {
                        println!("  {}", column);
                    }
                }
            }
        }

        Commands::Config { set_dataset, set_model, set_encoder, show } => {
            let mut config = config;
            let mut changed = false;

            if let Some(path) = set_dataset {
                config.dataset_path = Some(path.clone());
                changed = true;
            }
            if let Some(path) = set_model {
                config.model_path = Some(path.clone());
                changed = true;
            }
            if let Some(path) = set_encoder {
                config.encoder_path = Some(path.clone());
                changed = true;
            }
            if changed {
                config.save()?;
                println!("✔ 設定を保存しました");
            }

            if *show || !changed {
                let show_path = |p: &Option<std::path::PathBuf>| {
                    p.as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "未設定".into())
                };
                println!("設定:");
                println!("  データセット: {}", show_path(&config.dataset_path));
                println!("  モデル: {}", show_path(&config.model_path));
                println!("  エンコーダ: {}", show_path(&config.encoder_path));
                println!("  上位件数: {}", config.top_n);
                match &config.state_columns {
                    Some(names) => println!("  州列: {}", names.join(", ")),
                    None => println!("  州列: {}列目以降", config.state_column_start),
                }
                println!("  除外列: {}", config.exclude_columns.join(", "));
                println!("  低懸念ラベル: {}", config.low_label);
            }
        }
    }

    Ok(())
}
