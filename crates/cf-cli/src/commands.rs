use std::path::PathBuf;
use std::sync::Arc;

use cf_api::{normalize_json, simulate_tree, EditorSession, OpenSessionOptions};
use cf_codec::{to_json, ScriptPayload};
use cf_core::{count_blocks, FlowError};
use cf_runtime::{FlowState, SimulationOptions, WalkMode};
use tracing::debug;

use crate::{
    load_roster, map_cli_json_write, read_payload_file, read_payloads_from_dir,
    resolve_scripts_dir, resolve_source_file, write_payload, BreadcrumbView,
    DirectoryScriptFetcher, NavigateArgs, NavigationResult, NormalizeArgs, ScriptCheck,
    SimulateArgs, ValidateArgs,
};

const DEFAULT_ENTRY_SCRIPT: &str = "main";

fn to_line_json<T: serde::Serialize>(value: &T) -> Result<String, FlowError> {
    serde_json::to_string(value).map_err(map_cli_json_write)
}

pub(crate) fn run_validate(args: ValidateArgs) -> Result<i32, FlowError> {
    let checks = match (args.file, args.scripts_dir) {
        (Some(file), _) => {
            let path = resolve_source_file(&file)?;
            vec![check_payload(
                path.display().to_string(),
                read_payload_file(&path)?,
            )?]
        }
        (None, Some(scripts_dir)) => {
            let root = resolve_scripts_dir(&scripts_dir)?;
            read_payloads_from_dir(&root)?
                .into_iter()
                .map(|(source, payload)| check_payload(source, payload))
                .collect::<Result<Vec<_>, _>>()?
        }
        (None, None) => {
            return Err(FlowError::new(
                "CLI_SOURCE_MISSING",
                "Pass --file or --scripts-dir.",
            ))
        }
    };

    let mut lines = vec!["RESULT:OK".to_string(), format!("SCRIPTS:{}", checks.len())];
    for check in &checks {
        lines.push(format!("SCRIPT:{}", check.name));
        lines.push(format!("ERRORS:{}", check.report.errors));
        lines.push(format!("WARNINGS:{}", check.report.warnings));
        lines.push(format!("REPORT_JSON:{}", to_line_json(check)?));
    }
    print_lines(&lines);
    Ok(0)
}

pub(crate) fn check_payload(
    source: String,
    payload: ScriptPayload,
) -> Result<ScriptCheck, FlowError> {
    let session = EditorSession::open(payload, OpenSessionOptions::default())?;
    let report = session.validate();
    debug!(
        script = session.name(),
        errors = report.errors,
        warnings = report.warnings,
        "checked script"
    );
    Ok(ScriptCheck {
        source,
        name: session.name().to_string(),
        report,
    })
}

pub(crate) fn run_normalize(args: NormalizeArgs) -> Result<i32, FlowError> {
    let path = resolve_source_file(&args.file)?;
    let mut session = EditorSession::open(
        read_payload_file(&path)?,
        OpenSessionOptions {
            fetcher: None,
            id_seed: args.seed,
        },
    )?;
    let payload = session.save_payload(None)?;
    let blocks = count_blocks(session.navigation().root());

    let last = match args.out {
        Some(out) => {
            let out = PathBuf::from(out);
            write_payload(&out, &payload)?;
            format!("OUT:{}", out.display())
        }
        None => format!("PAYLOAD_JSON:{}", to_line_json(&payload)?),
    };
    print_lines(&[
        "RESULT:OK".to_string(),
        format!("SCRIPT:{}", payload.name),
        format!("BLOCKS:{}", blocks),
        last,
    ]);
    Ok(0)
}

pub(crate) fn run_simulate(args: SimulateArgs) -> Result<i32, FlowError> {
    let path = resolve_source_file(&args.file)?;
    let payload = read_payload_file(&path)?;
    let walk = args
        .walk
        .as_deref()
        .map(str::parse::<WalkMode>)
        .transpose()?;
    let roster = load_roster(args.roster.as_deref())?;

    // The editor simulates over the script's own blocks, not the SCRIPT wrapper.
    let blocks = normalize_json(&payload.blocks, None)?;
    let state = simulate_tree(&blocks, &args.target, &roster, &SimulationOptions { walk });
    print_lines(&state_lines(&state)?);
    Ok(0)
}

pub(crate) fn state_lines(state: &FlowState) -> Result<Vec<String>, FlowError> {
    let visible = state
        .visible_characters()
        .into_iter()
        .map(|character| character.name.as_str())
        .collect::<Vec<_>>();
    Ok(vec![
        "RESULT:OK".to_string(),
        format!("TARGET_REACHED:{}", state.target_reached),
        format!("BRANCH:{}", state.branch_path()),
        format!(
            "VISIBLE:{}",
            if visible.is_empty() {
                "NONE".to_string()
            } else {
                visible.join(",")
            }
        ),
        format!("STATE_JSON:{}", to_line_json(state)?),
    ])
}

pub(crate) fn run_navigate(args: NavigateArgs) -> Result<i32, FlowError> {
    let root = resolve_scripts_dir(&args.scripts_dir)?;
    let fetcher = DirectoryScriptFetcher::new(root);
    let entry = args.entry.as_deref().unwrap_or(DEFAULT_ENTRY_SCRIPT);
    let entry_path = fetcher.script_path(entry)?;
    if !entry_path.is_file() {
        return Err(FlowError::new(
            "CLI_ENTRY_NOT_FOUND",
            format!("Entry script file does not exist: {}", entry_path.display()),
        ));
    }

    let mut session = EditorSession::open(
        read_payload_file(&entry_path)?,
        OpenSessionOptions {
            fetcher: Some(Arc::new(fetcher)),
            id_seed: None,
        },
    )?;
    let result = navigate(&mut session, &args.path)?;

    let mut lines = vec![
        "RESULT:OK".to_string(),
        format!("DEPTH:{}", result.breadcrumbs.len()),
    ];
    for crumb in &result.breadcrumbs {
        lines.push(format!("BREADCRUMB_JSON:{}", to_line_json(crumb)?));
    }
    lines.push(format!(
        "DOCUMENT:{}",
        result.document.as_deref().unwrap_or("ROOT")
    ));
    lines.push(format!("VISIBLE_JSON:{}", to_line_json(&result.visible)?));
    print_lines(&lines);
    Ok(0)
}

/// Zooms through `path` in order. The first failing step aborts the walk.
pub(crate) fn navigate(
    session: &mut EditorSession,
    path: &[String],
) -> Result<NavigationResult, FlowError> {
    for block_id in path {
        session.zoom_in(block_id)?;
    }

    let stack = session.navigation();
    Ok(NavigationResult {
        breadcrumbs: stack
            .breadcrumbs()
            .iter()
            .enumerate()
            .map(|(index, entry)| BreadcrumbView {
                index,
                id: entry.id.clone(),
                kind: entry.kind.as_str(),
                name: entry.name.clone(),
            })
            .collect(),
        document: stack.current_document_name().map(str::to_string),
        visible: to_json(stack.visible_blocks()),
    })
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}
