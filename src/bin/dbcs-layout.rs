use std::io::Read;
use std::process::ExitCode;
use std::sync::Arc;

use dbcs_layout::{
    Compat, DbcsRange, ExtFont, FixedAdvance, FontContext, FontId, LayoutConfig, LayoutEngine,
    MarkupMode,
};

const FONT: FontId = 0;

struct Args {
    path: String,
    width: i32,
    advance: i32,
    height: i32,
    dbcs_width: i32,
    dbcs_height: i32,
    dbcs: DbcsRange,
    markup: MarkupMode,
    compat: Compat,
    metrics_only: bool,
}

fn main() -> ExitCode {
    match run(std::env::args().collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("error: {}", msg);
            eprintln!("{}", help_text());
            ExitCode::FAILURE
        }
    }
}

fn run(args: Vec<String>) -> Result<(), String> {
    let cli = parse_args(args)?;
    let text = read_input(&cli.path)?;

    let mut fonts = FontContext::new();
    let ext = ExtFont::new("cli.fnt", cli.dbcs_width, cli.dbcs_height).map_err(|e| e.to_string())?;
    fonts.register_ext_font(ext).map_err(|e| e.to_string())?;
    fonts.bind_font(FONT, "cli.fnt").map_err(|e| e.to_string())?;

    let cfg = LayoutConfig {
        markup: cli.markup,
        ..LayoutConfig::for_encoding(cli.dbcs)
    }
    .with_compat(cli.compat);
    let engine = LayoutEngine::new(
        cfg,
        Arc::new(FixedAdvance::new(cli.advance, cli.height)),
        Arc::new(fonts),
    );

    if !cli.metrics_only {
        let mut index = 0usize;
        engine.layout_with(FONT, &text, cli.width, |line| {
            println!(
                "{:>4} @{:<6} w={:<5} g={:<4} |{}|",
                index,
                line.offset,
                line.width,
                line.glyphs,
                escape(line.text)
            );
            index += 1;
        });
    }

    let metrics = engine.text_metrics(FONT, &text, cli.width);
    println!(
        "lines={} max_line_width={} max_word_width={} longest_line={}",
        metrics.line_count,
        metrics.max_line_width,
        metrics.max_word_width,
        engine.longest_line_width(FONT, &text)
    );
    Ok(())
}

fn read_input(path: &str) -> Result<Vec<u8>, String> {
    if path == "-" {
        let mut buf = Vec::with_capacity(4096);
        std::io::stdin()
            .read_to_end(&mut buf)
            .map_err(|e| e.to_string())?;
        return Ok(buf);
    }
    std::fs::read(path).map_err(|e| format!("read {}: {}", path, e))
}

/// Printable ASCII passes through; everything else becomes `\xNN`.
fn escape(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        if (0x20..0x7F).contains(&b) {
            out.push(char::from(b));
        } else {
            out.push_str(&format!("\\x{:02x}", b));
        }
    }
    out
}

fn parse_int(flag: &str, value: Option<&String>) -> Result<i32, String> {
    let v = value.ok_or_else(|| format!("{} requires a value", flag))?;
    v.parse::<i32>()
        .map_err(|_| format!("invalid {} value '{}'", flag, v))
}

fn parse_args(args: Vec<String>) -> Result<Args, String> {
    if args.len() >= 2 && (args[1] == "--help" || args[1] == "-h") {
        return Err("help requested".to_string());
    }
    let path = match args.get(1) {
        Some(p) if !p.starts_with("--") => p.clone(),
        _ => return Err("missing input path (use - for stdin)".to_string()),
    };

    let mut cfg = Args {
        path,
        width: 240,
        advance: 8,
        height: 16,
        dbcs_width: 12,
        dbcs_height: 12,
        dbcs: DbcsRange::GBK,
        markup: MarkupMode::Extended,
        compat: Compat::canonical(),
        metrics_only: false,
    };

    let mut i = 2usize;
    while i < args.len() {
        let value = args.get(i + 1);
        match args[i].as_str() {
            "--width" => cfg.width = parse_int("--width", value)?,
            "--advance" => cfg.advance = parse_int("--advance", value)?,
            "--height" => cfg.height = parse_int("--height", value)?,
            "--dbcs-width" => cfg.dbcs_width = parse_int("--dbcs-width", value)?,
            "--dbcs-height" => cfg.dbcs_height = parse_int("--dbcs-height", value)?,
            "--encoding" => {
                let v = value.ok_or_else(|| "--encoding requires a value".to_string())?;
                cfg.dbcs = match v.as_str() {
                    "gbk" => DbcsRange::GBK,
                    "gb2312" => DbcsRange::GB2312,
                    other => return Err(format!("unknown encoding '{}'", other)),
                };
            }
            "--markup" => {
                let v = value.ok_or_else(|| "--markup requires a value".to_string())?;
                cfg.markup = match v.as_str() {
                    "off" => MarkupMode::Off,
                    "legacy" => MarkupMode::Legacy,
                    "extended" => MarkupMode::Extended,
                    other => return Err(format!("unknown markup mode '{}'", other)),
                };
            }
            "--glyph" => {
                cfg.compat = Compat::legacy_metrics();
                i += 1;
                continue;
            }
            "--metrics-only" => {
                cfg.metrics_only = true;
                i += 1;
                continue;
            }
            other => return Err(format!("unknown option '{}'", other)),
        }
        i += 2;
    }
    Ok(cfg)
}

fn help_text() -> &'static str {
    r#"dbcs-layout - wrap GBK/GB2312 text and report line metrics

USAGE:
  cargo run --features cli --bin dbcs-layout -- <file|-> [options]

OPTIONS:
  --width <n>            box width in pixels (default: 240)
  --advance <n>          single-byte glyph advance (default: 8)
  --height <n>           single-byte font height (default: 16)
  --dbcs-width <n>       double-byte glyph cell width (default: 12)
  --dbcs-height <n>      double-byte glyph cell height (default: 12)
  --encoding <gbk|gb2312>
  --markup <off|legacy|extended>
  --glyph                glyph-level walk with one-byte rewind
  --metrics-only         skip the per-line listing
"#
}
