//! Optional user configuration, loaded once from `bfvm.toml` in the XDG
//! config home. Missing file or unparseable values fall back to defaults.

use crate::machine::DEFAULT_TAPE_LEN;
use crate::theme::catppuccin::Mocha as P;
use cross_xdg::BaseDirs;
use nu_ansi_term::Color;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Settings {
    /// Tape length in cells for machines created by the CLI and REPL.
    pub tape_len: usize,
    /// Whether the parser coalesces runs of identical instructions.
    pub coalesce: bool,
    pub colors: Colors,
}

/// REPL highlighter colors, keyed by instruction class.
#[derive(Debug, Clone)]
pub struct Colors {
    pub op_right: Color,    // '>'
    pub op_left: Color,     // '<'
    pub op_inc: Color,      // '+'
    pub op_dec: Color,      // '-'
    pub op_output: Color,   // '.'
    pub op_bracket: Color,  // '[' and ']'
    pub non_code: Color,    // everything else (comments)
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tape_len: DEFAULT_TAPE_LEN,
            coalesce: true,
            colors: Colors::default(),
        }
    }
}

impl Default for Colors {
    fn default() -> Self {
        // Movement in the blues, data in green/red, I/O yellow, flow mauve
        Self {
            op_right: P::SKY,
            op_left: P::TEAL,
            op_inc: P::GREEN,
            op_dec: P::RED,
            op_output: P::YELLOW,
            op_bracket: P::MAUVE,
            non_code: P::SURFACE2,
        }
    }
}

static SETTINGS: OnceLock<Settings> = OnceLock::new();

pub fn settings() -> &'static Settings {
    SETTINGS.get_or_init(|| load_from_toml().unwrap_or_default())
}

fn parse_color(value: &str) -> Option<Color> {
    let s = value.trim();
    if let Some(hex) = s.strip_prefix('#') {
        if hex.len() == 6 {
            if let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            ) {
                return Some(Color::Rgb(r, g, b));
            }
        }
    } else {
        // Try named colors matching nu_ansi_term::Color variants
        let name = s.to_ascii_lowercase();
        return Some(match name.as_str() {
            "black" => Color::Black,
            "red" => Color::Red,
            "green" => Color::Green,
            "yellow" => Color::Yellow,
            "blue" => Color::Blue,
            "magenta" | "purple" => Color::Purple,
            "cyan" => Color::Cyan,
            "darkgray" | "dark_grey" | "darkgrey" | "dark_gray" => Color::DarkGray,
            "lightred" | "light_red" => Color::LightRed,
            "lightgreen" | "light_green" => Color::LightGreen,
            "lightblue" | "light_blue" => Color::LightBlue,
            "lightmagenta" | "light_magenta" | "lightpurple" | "light_purple" => {
                Color::LightPurple
            }
            "lightcyan" | "light_cyan" => Color::LightCyan,
            "white" => Color::White,
            _ => return None,
        });
    }
    None
}

fn load_from_toml() -> Option<Settings> {
    let base_dirs = BaseDirs::new().unwrap();

    // On Linux: resolves to /home/<user>/.config
    // On Windows: resolves to C:\Users\<user>\.config
    // On macOS: resolves to /Users/<user>/.config
    let config_home = base_dirs.config_home();

    let mut path = PathBuf::from(config_home);
    path.push("bfvm.toml");

    let content = fs::read_to_string(path).ok()?;
    // Very small hand-rolled parser: [interpreter] and [colors] sections with
    // key = value pairs. Color values are strings like "#RRGGBB" or named
    // colors; interpreter values are a bare integer and a bare bool.
    let mut section = String::new();
    let mut interpreter: HashMap<String, String> = HashMap::new();
    let mut colors: HashMap<String, String> = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') { continue; }
        if line.starts_with('[') && line.ends_with(']') {
            section = line[1..line.len() - 1].to_string();
            continue;
        }
        let map = match section.as_str() {
            "interpreter" => &mut interpreter,
            "colors" => &mut colors,
            _ => continue,
        };
        if let Some(eq) = line.find('=') {
            let key = line[..eq].trim().to_string();
            let val_raw = line[eq + 1..].trim();
            // Accept quoted or unquoted
            let val = if val_raw.starts_with('"') && val_raw.ends_with('"') && val_raw.len() >= 2 {
                val_raw[1..val_raw.len() - 1].to_string()
            } else {
                val_raw.to_string()
            };
            map.insert(key, val);
        }
    }

    let mut cfg = Settings::default();

    if let Some(v) = interpreter.get("tape_len").and_then(|s| s.parse::<usize>().ok()) {
        if v > 0 {
            cfg.tape_len = v;
        }
    }
    if let Some(v) = interpreter.get("coalesce").and_then(|s| s.parse::<bool>().ok()) {
        cfg.coalesce = v;
    }

    macro_rules! set {
        ($field:ident, $key:literal) => {
            if let Some(v) = colors.get($key).and_then(|s| parse_color(s)) {
                cfg.colors.$field = v;
            }
        };
    }

    set!(op_right, "op_right");
    set!(op_left, "op_left");
    set!(op_inc, "op_inc");
    set!(op_dec, "op_dec");
    set!(op_output, "op_output");
    set!(op_bracket, "op_bracket");
    set!(non_code, "non_code");

    Some(cfg)
}
