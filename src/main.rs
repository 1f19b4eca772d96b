use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

mod cli;

use anneal::audit::AuditLog;
use anneal::config::EngineConfig;
use anneal::content::HttpExtractor;
use anneal::engine::RefineEngine;
use anneal::llm::{OpenAiConfig, OpenAiGenerator};
use cli::Cli;
use cli::commands::Commands;

fn setup_logging() -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("anneal")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("anneal.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn build_engine(config: &EngineConfig) -> Result<RefineEngine> {
    let generator = OpenAiGenerator::new(OpenAiConfig {
        model: config.llm.model.clone(),
        timeout: config.llm.timeout(),
    })
    .context("Failed to create generation client")?;

    let extractor = HttpExtractor::new(config.content.fetch_timeout())
        .context("Failed to create content extractor")?;

    let mut engine = RefineEngine::new(Arc::new(generator), Arc::new(extractor), config.clone());

    if config.audit.enabled {
        let audit_dir = config.audit.dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("anneal")
                .join("runs")
        });
        match AuditLog::open(&audit_dir) {
            Ok(audit) => engine = engine.with_audit(audit),
            Err(e) => log::warn!("audit log disabled: {}", e),
        }
    }

    Ok(engine)
}

async fn run_application(cli: &Cli, config: &EngineConfig) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    let engine = build_engine(config)?;

    match &cli.command {
        Commands::Direct { question, sources } => {
            let report = engine
                .run_direct(question, sources.as_deref())
                .await
                .context("Direct run failed")?;

            println!("{}", "===== 直接回答 =====".cyan());
            println!("{}", report.answer);
            println!();
            println!("{}", format!("評分：{:.2}", report.score).green());
            println!("{}", format!("使用 token 數：{}", report.tokens_used).dimmed());
            if !report.core_facts.is_empty() {
                println!("{}", "核心事實：".cyan());
                println!("{}", report.core_facts);
            }
        }

        Commands::Refine {
            question,
            sources,
            facts,
            compare_direct,
            iterations,
        } => {
            let report = engine
                .run_refinement(question, sources.as_deref(), facts.clone())
                .await
                .context("Refinement run failed")?;

            println!("{}", "===== 最終答案 =====".cyan());
            println!("{}", report.final_answer);
            println!();
            println!(
                "{}",
                format!(
                    "初始評分：{:.2}　最終評分：{:.2}",
                    report.initial_score, report.final_score
                )
                .green()
            );
            println!("{}", format!("總共使用 token 數：{}", report.total_tokens).dimmed());

            if *iterations {
                println!("{}", "===== 迭代紀錄 =====".cyan());
                for record in &report.iterations {
                    println!(
                        "迭代 {} - 評分 {:.2}",
                        record.index, record.evaluation.score
                    );
                }
            }

            if let Some(comparison) = &report.comparison {
                println!("{}", "===== 與初始回答比較 =====".cyan());
                println!("{}", comparison);
            }

            if *compare_direct {
                let direct = engine
                    .run_direct(question, sources.as_deref())
                    .await
                    .context("Direct run failed")?;
                let comparison = engine
                    .compare(question, &direct.answer, &report.final_answer)
                    .await
                    .context("Comparison failed")?;

                println!("{}", "===== 與直接回答比較 =====".cyan());
                println!("{}", comparison);
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging()?;

    let cli = Cli::parse();
    let config = EngineConfig::load(cli.config.as_ref())?;
    config.validate()?;

    run_application(&cli, &config).await
}
