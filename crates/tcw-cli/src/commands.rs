use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use colored::{ColoredString, Colorize};
use tokio::sync::mpsc;
use tracing::{info, warn};

use tcw_diff::{compute, DiffOutput, SpanKind};
use tcw_workbench::{
    FinalDocumentOptions, JobState, PageImage, RecognitionOptions, SessionCommand, Surface,
    VersionKey, Workbench, WorkbenchConfig,
};

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Diff(ref args) => cmd_diff(args, &cli.format),
        Command::Recognize(ref args) => {
            let config = load_config(&cli)?;
            cmd_recognize(args, config, &cli.format).await
        }
        Command::Generate(ref args) => {
            let config = load_config(&cli)?;
            cmd_generate(args, config).await
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<WorkbenchConfig> {
    let mut config = match &cli.config {
        Some(path) => WorkbenchConfig::load(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => WorkbenchConfig::default(),
    };
    if let Some(server) = &cli.server {
        config.server_url = server.clone();
    }
    Ok(config)
}

fn cmd_diff(args: &DiffArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let left = read_text(&args.left)?;
    let right = read_text(&args.right)?;
    let diff = compute(&left, &right);

    if let OutputFormat::Json = format {
        println!("{}", serde_json::to_string_pretty(&diff)?);
        return Ok(());
    }

    if diff.is_identical() {
        println!("{} No differences.", "✓".green().bold());
        return Ok(());
    }

    let left_lines: Vec<&str> = left.split('\n').collect();
    let right_lines: Vec<&str> = right.split('\n').collect();
    let changed: BTreeSet<usize> = diff
        .left_spans
        .iter()
        .chain(&diff.right_spans)
        .map(|span| span.line)
        .collect();
    for line in changed {
        let anchor = if diff.index.iter().any(|e| e.line == line) { "*" } else { " " };
        println!("{}{}", anchor.yellow().bold(), format!("line {}", line + 1).bold());
        let l = left_lines.get(line).copied().unwrap_or("");
        let r = right_lines.get(line).copied().unwrap_or("");
        println!("  {} {}", "<".red(), render_line(&diff, Surface::Left, line, l));
        println!("  {} {}", ">".green(), render_line(&diff, Surface::Right, line, r));
    }
    println!(
        "\n{} changed line(s), {} navigable, -{} +{} chars",
        diff.changed_lines.to_string().bold(),
        diff.index.len().to_string().bold(),
        diff.deleted_chars(),
        diff.inserted_chars(),
    );
    Ok(())
}

fn render_line(diff: &DiffOutput, surface: Surface, line: usize, text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    diff.spans_on_line(surface, line)
        .map(|span| {
            let end = span.end().min(chars.len());
            let start = span.offset.min(end);
            let piece: String = chars[start..end].iter().collect();
            paint(span.kind, piece).to_string()
        })
        .collect()
}

fn paint(kind: SpanKind, piece: String) -> ColoredString {
    match kind {
        SpanKind::Equal => piece.normal(),
        SpanKind::Delete => piece.red().strikethrough(),
        SpanKind::Insert => piece.green().underline(),
    }
}

async fn cmd_recognize(
    args: &RecognizeArgs,
    config: WorkbenchConfig,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let mut options = config.recognition.clone();
    apply_recognition_flags(&mut options, args);

    let mut workbench = Workbench::connect(config);
    workbench.load_images(read_images(&args.images)?)?;

    let id = workbench.start_recognition(&options).await?;
    println!("{} Recognition job {} submitted", "→".cyan(), id.short_id().yellow());
    let state = drive(&mut workbench).await?;
    if state != JobState::Completed {
        println!("{} Cancelled.", "✗".red());
        return Ok(());
    }

    if let OutputFormat::Json = format {
        println!("{}", serde_json::to_string_pretty(workbench.store().pages())?);
    } else {
        for (page, result) in workbench.store().pages().iter().enumerate() {
            println!("{}", format!("── page {} ──", page + 1).bold());
            println!("{}", result.text(VersionKey::Merged));
        }
    }

    if let Some(dir) = &args.out_dir {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        for (page, result) in workbench.store().pages().iter().enumerate() {
            for key in VersionKey::ALL.into_iter().filter(|k| result.has_text(*k)) {
                let path = dir.join(format!("page-{}.{}.txt", page + 1, key));
                std::fs::write(&path, result.text(key))
                    .with_context(|| format!("writing {}", path.display()))?;
            }
        }
        println!("{} Results written to {}", "✓".green().bold(), dir.display());
    }
    Ok(())
}

fn apply_recognition_flags(options: &mut RecognitionOptions, args: &RecognizeArgs) {
    if let Some(model) = args.htr_model {
        options.htr_model_id = model;
    }
    if let Some(model) = &args.llm_model {
        options.llm_model = model.clone();
    }
    if let Some(t) = args.temperature {
        options.temperature = t;
    }
    if let Some(mode) = args.mode {
        options.mode = mode;
    }
}

async fn cmd_generate(args: &GenerateArgs, config: WorkbenchConfig) -> anyhow::Result<()> {
    if args.texts.len() != args.images.len() {
        bail!("{} text file(s) given for {} image(s)", args.texts.len(), args.images.len());
    }
    let mut options = config.final_document.clone();
    apply_generate_flags(&mut options, args);

    let mut workbench = Workbench::connect(config);
    workbench.load_images(read_images(&args.images)?)?;
    for (page, path) in args.texts.iter().enumerate() {
        workbench.store_mut().set_field(page, VersionKey::Merged, read_text(path)?);
    }
    workbench.select(Surface::Right, VersionKey::Merged);

    let id = workbench.generate_final_document(&options).await?;
    println!("{} Document job {} submitted", "→".cyan(), id.short_id().yellow());
    if drive(&mut workbench).await? != JobState::Completed {
        println!("{} Cancelled.", "✗".red());
        return Ok(());
    }

    let Some(document) = workbench.final_document() else {
        bail!("job completed without a document");
    };
    match &args.out {
        Some(path) => {
            std::fs::write(path, &document.document)
                .with_context(|| format!("writing {}", path.display()))?;
            println!("{} Document written to {}", "✓".green().bold(), path.display());
        }
        None => println!("{}", document.document),
    }
    if let Some(path) = &args.plain_out {
        std::fs::write(path, &document.plain_text)
            .with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(())
}

fn apply_generate_flags(options: &mut FinalDocumentOptions, args: &GenerateArgs) {
    if let Some(prompt) = args.prompt {
        options.prompt = prompt;
    }
    if let Some(text) = &args.custom_prompt {
        options.custom_prompt = Some(text.clone());
    }
    if let Some(model) = &args.llm_model {
        options.llm_model = model.clone();
    }
    if let Some(t) = args.temperature {
        options.temperature = t;
    }
    if let Some(mode) = args.mode {
        options.mode = mode;
    }
}

/// Drive the current job to the end; Ctrl-C cancels it.
async fn drive(workbench: &mut Workbench) -> anyhow::Result<JobState> {
    let (tx, mut rx) = mpsc::channel(1);
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling job");
            let _ = tx.send(SessionCommand::Cancel).await;
        }
    });
    let result = workbench.drive_job(&mut rx).await;
    interrupt.abort();

    let state = result?;
    if let Some(status) = workbench.status_text() {
        info!(%status, "job finished");
    }
    Ok(state)
}

fn read_text(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn read_images(paths: &[PathBuf]) -> anyhow::Result<Vec<PageImage>> {
    paths
        .iter()
        .map(|path| {
            let data = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            Ok(PageImage::new(name, data))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_line_covers_whole_line() {
        colored::control::set_override(false);
        let diff = compute("cat", "cot");
        assert_eq!(render_line(&diff, Surface::Left, 0, "cat"), "cat");
        assert_eq!(render_line(&diff, Surface::Right, 0, "cot"), "cot");
    }

    #[test]
    fn read_images_uses_file_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brief-1.jpg");
        std::fs::write(&path, [0xffu8, 0xd8]).unwrap();
        let images = read_images(&[path]).unwrap();
        assert_eq!(images[0].file_name, "brief-1.jpg");
        assert_eq!(images[0].mime_type, "image/jpeg");
        assert_eq!(images[0].len(), 2);
    }

    #[test]
    fn missing_file_is_reported() {
        let err = read_text(Path::new("/definitely/not/here.txt")).unwrap_err();
        assert!(err.to_string().contains("reading"));
    }
}
