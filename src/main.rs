use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;

use crossmap::cli::{CliArgs, OutputMode, RunConfig};
use crossmap::dump::ViewDump;
use crossmap::exchange::{self, MappingFileDocument};
use crossmap::model::FrameworkStore;
use crossmap::{CommandEngine, EditorConfig};

fn main() -> Result<()> {
    let args = CliArgs::parse();
    crossmap::tracing::init(args.verbose);

    let run = args.into_config().map_err(|e| anyhow::anyhow!(e))?;

    let output = render(&run, EditorConfig::load())?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

fn load_frameworks(run: &RunConfig) -> FrameworkStore {
    let mut store = FrameworkStore::new();
    let files = crossmap::config_paths::framework_files()
        .into_iter()
        .chain(run.frameworks.iter().cloned());
    for path in files {
        if let Err(e) = store.load_file(&path) {
            tracing::warn!("Skipping framework {}: {:#}", path.display(), e);
        }
    }
    tracing::debug!(frameworks = store.len(), "framework registry ready");
    store
}

fn render(run: &RunConfig, config: EditorConfig) -> Result<String> {
    let registry = load_frameworks(run);
    let document = MappingFileDocument::load(&run.file)?;
    let file = exchange::open_collection(&document, &registry)
        .with_context(|| format!("opening {}", run.file.display()))?;

    if run.output == OutputMode::Export {
        let objects = exchange::export_mapping_objects(&file, file.records());
        let mut json = serde_json::to_string_pretty(&objects)?;
        json.push('\n');
        return Ok(json);
    }

    let mut engine = CommandEngine::new(config);
    let id = engine.open(file);
    let editor = engine.editor_mut(id)?;

    if !run.breakouts.is_empty() {
        editor.view.breakouts.set(run.breakouts.iter().copied());
    }
    for (field, value) in &run.hidden {
        editor
            .view
            .filters
            .control_mut(*field)
            .set_visible(value.as_deref(), false);
    }
    editor.view.rebuild_breakouts(&editor.file);
    if run.collapse {
        editor.view.set_records_collapsed(true, true);
        editor.view.recalculate_positions();
    }

    let dump = ViewDump::from_editor(editor, run.window);
    match run.output {
        OutputMode::Json => {
            let mut json = serde_json::to_string_pretty(&dump)?;
            json.push('\n');
            Ok(json)
        }
        _ => Ok(dump.to_text()),
    }
}
