// build.rs
//
// Compiles `locales/<lang>.toml` into the `t!` macro. The macro supplies the
// default message templates of the catalog and the strings of the help screens.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;

const FALLBACK_LANG: &str = "en";

fn load_locale(lang: &str) -> Option<BTreeMap<String, String>> {
    let path = format!("locales/{}.toml", lang);
    let content = fs::read_to_string(&path).ok()?;
    let table: BTreeMap<String, String> =
        toml::from_str(&content).unwrap_or_else(|e| panic!("Failed to parse {}: {}", path, e));
    Some(table)
}

fn main() {
    // --- 1. Pick the language: `lang_*` features first, then CMDTREE_LANG ---
    let mut active_langs: Vec<String> = env::vars()
        .filter_map(|(key, _)| {
            key.strip_prefix("CARGO_FEATURE_LANG_")
                .map(str::to_lowercase)
        })
        .collect();
    active_langs.sort();

    let lang = match active_langs.first() {
        Some(first) => {
            if active_langs.len() > 1 {
                println!(
                    "cargo:warning=Multiple language features enabled ({:?}). Using '{}'.",
                    active_langs, first
                );
            }
            first.clone()
        }
        None => env::var("CMDTREE_LANG").unwrap_or_else(|_| FALLBACK_LANG.to_string()),
    };

    println!("cargo:rustc-env=CMDTREE_LANG_EFFECTIVE={}", lang);
    println!("cargo:rerun-if-env-changed=CMDTREE_LANG");
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=locales/");

    // --- 2. English is always loaded; it defines the full key set ---
    let mut translations = load_locale(FALLBACK_LANG)
        .expect("Failed to read fallback language file: locales/en.toml");

    // --- 3. Overlay the selected language ---
    if lang != FALLBACK_LANG {
        match load_locale(&lang) {
            Some(specific) => {
                for key in specific.keys() {
                    if !translations.contains_key(key) {
                        println!(
                            "cargo:warning=Key '{}' in locales/{}.toml does not exist in locales/en.toml.",
                            key, lang
                        );
                    }
                }
                translations.extend(specific);
            }
            None => println!(
                "cargo:warning=Language file 'locales/{}.toml' not found. Falling back to 'en'.",
                lang
            ),
        }
    }

    // --- 4. Generate the `t!` macro, one literal arm per key ---
    let mut macro_code =
        String::from("/// Looks up a compiled-in string by key.\n#[macro_export]\nmacro_rules! t {\n");
    for (key, value) in &translations {
        let escaped_value = value.replace('\\', "\\\\").replace('"', "\\\"");
        macro_code.push_str(&format!("    (\"{}\") => {{ \"{}\" }};\n", key, escaped_value));
    }
    macro_code.push_str(
        "    ($key:expr) => {{ compile_error!(concat!(\"Missing translation key: \", $key)) }};\n",
    );
    macro_code.push('}');

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR is always set for build scripts");
    let dest_path = Path::new(&out_dir).join("translations.rs");
    fs::write(&dest_path, macro_code).expect("Failed to write translations.rs");
}
