//! DHAT heap profiler for dbcs-layout.
//!
//! Profiles allocation patterns of the text pipeline:
//! layout -> metrics queries -> draw plan.
//!
//! Usage:
//!   cargo run -p dbcs-layout-heap-profile --release -- [OPTIONS] [TEXT_FILES...]
//!
//! Input files are raw GBK bytes. Without files a synthetic dialog corpus is
//! profiled. Outputs dhat-<phase>.json files in the output directory
//! (default: target/memory).
//! Open in https://nnethercote.github.io/dh_view/dh_view.html

#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use dbcs_layout::{
    ExtFont, FixedAdvance, FontContext, FontContextError, FontId, LayoutConfig, LayoutEngine,
};
use dbcs_layout_render::{DrawConfig, DrawPlanner, HAlign, NoColorNames, VAlign};

const BOX_WIDTH: i32 = 240;
const BOX_HEIGHT: i32 = 160;
const FONT: FontId = 0;
const SYNTHETIC: &str = "synthetic";

const DIALOG_PIECES: &[&[u8]] = &[
    b"Welcome ",
    b"{traveler}",
    b". ",
    b"\xd6\xd0\xce\xc4",
    b"{~#ffcc00}gold}",
    b" and ",
    b"{~Light Blue}mana}",
    b"\n",
    b"  ",
    b"Supercalifragilistic",
    b"\xc4\xe3\xba\xc3\xca\xc0\xbd\xe7",
];

#[derive(Clone, Copy, PartialEq, Eq)]
enum Phase {
    Layout,
    Metrics,
    Plan,
    Full,
}

impl Phase {
    fn from_str(s: &str) -> Option<Self> {
        match s {
            "layout" => Some(Self::Layout),
            "metrics" => Some(Self::Metrics),
            "plan" => Some(Self::Plan),
            "full" => Some(Self::Full),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Layout => "layout",
            Self::Metrics => "metrics",
            Self::Plan => "plan",
            Self::Full => "full",
        }
    }
}

fn fonts() -> Result<FontContext, FontContextError> {
    let mut fonts = FontContext::new();
    fonts.register_ext_font(ExtFont::new("smalfont.fnt", 10, 10)?.with_shadow(false))?;
    fonts.register_ext_font(ExtFont::new("medfont.fnt", 12, 12)?.with_margins(1, 1, 2))?;
    fonts.bind_font(FONT, "MedFont.fnt")?;
    Ok(fonts)
}

fn engine() -> LayoutEngine {
    let fonts = fonts().unwrap_or_else(|e| {
        eprintln!("font setup failed: {}", e);
        std::process::exit(1);
    });
    LayoutEngine::new(
        LayoutConfig::default(),
        Arc::new(FixedAdvance::new(8, 16)),
        Arc::new(fonts),
    )
}

fn synthetic_corpus() -> Vec<u8> {
    let mut text = Vec::with_capacity(64 * 1024);
    let mut state = 0x2545_f491_u32;
    while text.len() < 60 * 1024 {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        text.extend_from_slice(DIALOG_PIECES[state as usize % DIALOG_PIECES.len()]);
        if state % 3 == 0 {
            text.push(b' ');
        }
    }
    text
}

fn load(path: &Path) -> Vec<u8> {
    if path.as_os_str() == SYNTHETIC {
        return synthetic_corpus();
    }
    std::fs::read(path).unwrap_or_else(|e| {
        eprintln!("read {}: {}", path.display(), e);
        std::process::exit(1);
    })
}

/// Split into dialog-sized boxes the way a game feeds text to the engine.
fn boxes(text: &[u8]) -> impl Iterator<Item = &[u8]> {
    text.split(|&b| b == b'\n').filter(|b| !b.is_empty())
}

fn profile_file(path: &Path, phase: Phase) {
    let text = load(path);
    let engine = engine();
    let planner = DrawPlanner::new(&engine, &NoColorNames);
    let cfg =
        DrawConfig::new(0, 0, BOX_WIDTH, BOX_HEIGHT).with_align(HAlign::Center, VAlign::Center);

    let mut lines = 0usize;
    match phase {
        Phase::Layout => {
            for chunk in boxes(&text) {
                lines += engine.layout_text(FONT, chunk, BOX_WIDTH).len();
            }
        }
        Phase::Metrics => {
            for chunk in boxes(&text) {
                lines += engine.text_metrics(FONT, chunk, BOX_WIDTH).line_count;
            }
        }
        Phase::Plan => {
            for chunk in boxes(&text) {
                lines += planner.plan(FONT, chunk, &cfg).lines_drawn;
            }
        }
        Phase::Full => {
            for chunk in boxes(&text) {
                let metrics = engine.text_metrics(FONT, chunk, BOX_WIDTH);
                let plan = planner.plan(FONT, chunk, &cfg);
                lines += metrics.line_count.max(plan.lines_drawn);
            }
            // Whole-corpus layout stresses the spill past the inline buffer.
            lines += engine.layout_text(FONT, &text, BOX_WIDTH).len();
        }
    }
    if lines == 0 && !text.is_empty() {
        eprintln!("{} produced zero lines", path.display());
        std::process::exit(1);
    }
}

/// Extract a short name from a file path for use in output filenames.
fn short_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unknown".to_string())
}

fn usage() {
    eprintln!("Usage: heap-profile [OPTIONS] [TEXT_FILES...]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --phase <layout|metrics|plan|full>  Pipeline phase to profile (default: plan)");
    eprintln!("  --out-dir <DIR>                     Output directory for dhat JSON (default: target/memory)");
    eprintln!(
        "  --aggregate                         Single profile for all files (default: per-file)"
    );
    eprintln!();
    eprintln!("By default, each file gets its own clean DHAT profile (separate process).");
    eprintln!("With --aggregate, all files share one profile.");
    eprintln!();
    eprintln!("If no files are given, profiles a synthetic GBK dialog corpus.");
}

fn next_value<'a>(args: &'a [String], i: usize, flag: &str) -> &'a str {
    match args.get(i) {
        Some(value) => value,
        None => {
            eprintln!("{} expects a value", flag);
            usage();
            std::process::exit(1);
        }
    }
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let mut phase = Phase::Plan;
    let mut out_dir = PathBuf::from("target/memory");
    let mut files: Vec<PathBuf> = Vec::with_capacity(8);
    let mut aggregate = false;
    // Internal flag: when set, we're a child process profiling a single file.
    let mut single_file_mode = false;
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "--phase" => {
                i += 1;
                let value = next_value(&args, i, "--phase");
                phase = Phase::from_str(value).unwrap_or_else(|| {
                    eprintln!("Unknown phase: {}", value);
                    usage();
                    std::process::exit(1);
                });
            }
            "--out-dir" => {
                i += 1;
                out_dir = PathBuf::from(next_value(&args, i, "--out-dir"));
            }
            "--aggregate" => {
                aggregate = true;
            }
            "--single-file" => {
                single_file_mode = true;
            }
            "--help" | "-h" => {
                usage();
                std::process::exit(0);
            }
            other => {
                files.push(PathBuf::from(other));
            }
        }
        i += 1;
    }

    if files.is_empty() {
        files.push(PathBuf::from(SYNTHETIC));
    }

    std::fs::create_dir_all(&out_dir).unwrap_or_else(|e| {
        eprintln!("Failed to create output dir {}: {}", out_dir.display(), e);
        std::process::exit(1);
    });

    let phase_name = phase.name();

    if single_file_mode {
        if files.len() != 1 {
            eprintln!("--single-file expects exactly one file");
            std::process::exit(1);
        }
        let file = &files[0];
        let name = short_name(file);
        let json_path = out_dir.join(format!("dhat-{phase_name}-{name}.json"));

        let _profiler = dhat::Profiler::builder().file_name(json_path).build();

        profile_file(file, phase);
        // _profiler drops here, writes JSON
        return;
    }

    if aggregate {
        let json_path = out_dir.join(format!("dhat-{phase_name}.json"));
        eprintln!(
            "heap-profile: phase={}, files={} (aggregate), out={}",
            phase_name,
            files.len(),
            out_dir.display()
        );

        let _profiler = dhat::Profiler::builder()
            .file_name(json_path.clone())
            .build();

        for file in &files {
            eprintln!("  profiling: {}", file.display());
            profile_file(file, phase);
        }

        eprintln!(
            "Done. Open {} in https://nnethercote.github.io/dh_view/dh_view.html",
            json_path.display()
        );
        return;
    }

    // Per-file mode: one child process per file for clean DHAT sessions.
    let self_exe = std::env::current_exe().unwrap_or_else(|e| {
        eprintln!("Failed to determine own executable path: {}", e);
        std::process::exit(1);
    });

    eprintln!(
        "heap-profile: phase={}, files={} (per-file), out={}",
        phase_name,
        files.len(),
        out_dir.display()
    );

    let mut any_failed = false;
    for file in &files {
        let name = short_name(file);
        eprintln!(
            "  profiling: {} -> dhat-{}-{}.json",
            file.display(),
            phase_name,
            name
        );

        let status = Command::new(&self_exe)
            .arg("--single-file")
            .arg("--phase")
            .arg(phase_name)
            .arg("--out-dir")
            .arg(&out_dir)
            .arg(file)
            .status();

        match status {
            Ok(s) if s.success() => {}
            Ok(s) => {
                eprintln!("    FAILED (exit {})", s.code().unwrap_or(-1));
                any_failed = true;
            }
            Err(e) => {
                eprintln!("    FAILED to spawn: {}", e);
                any_failed = true;
            }
        }
    }

    eprintln!();
    eprintln!("Profiles saved to {}:", out_dir.display());
    for file in &files {
        let json_path = out_dir.join(format!("dhat-{phase_name}-{}.json", short_name(file)));
        if json_path.exists() {
            eprintln!("  {}", json_path.display());
        }
    }

    if any_failed {
        std::process::exit(1);
    }
}
