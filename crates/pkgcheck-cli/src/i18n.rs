// crates/pkgcheck-cli/src/i18n.rs
// ============================================================================
// Module: CLI Internationalization Helpers
// Description: Message catalog and translation utilities for the CLI.
// Purpose: Keep every user-facing string in one place, per locale.
// Dependencies: std
// ============================================================================

//! ## Overview
//! User-facing strings of the `pkgcheck` CLI live in a small per-locale
//! catalog. Runtime output is routed through the [`t!`](crate::t) macro.
//! Diagnostics emitted through `tracing` are not translated.
//!
//! ## Invariants
//! - The locale is selected once and read-only thereafter.
//! - Missing keys fall back to English and then to the key itself.
//! - Placeholders are substituted in argument order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Supported CLI locales.
///
/// # Invariants
/// - [`Locale::En`] is the default fallback locale.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Locale {
    /// English (default).
    En,
    /// Catalan.
    Ca,
}

impl Locale {
    /// Returns the canonical locale label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ca => "ca",
        }
    }

    /// Parses a locale value (case-insensitive, tolerant of region tags).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        let lang = normalized.split(['-', '_', '.']).next().unwrap_or("");
        match lang {
            "en" => Some(Self::En),
            "ca" => Some(Self::Ca),
            _ => None,
        }
    }
}

/// Supported CLI locales in presentation order.
pub const SUPPORTED_LOCALES: &[Locale] = &[Locale::En, Locale::Ca];

/// A formatted message argument captured by the [`macro@crate::t`] macro.
#[derive(Clone)]
pub struct MessageArg {
    /// Placeholder name without braces (for example `path`).
    pub key: &'static str,
    /// Preformatted value substituted for the placeholder.
    pub value: String,
}

impl MessageArg {
    /// Constructs a new [`MessageArg`].
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Locale Selection
// ============================================================================

/// Locale selected for this process.
static CURRENT_LOCALE: OnceLock<Locale> = OnceLock::new();

/// Sets the CLI locale. Only the first call wins.
pub fn set_locale(locale: Locale) {
    let _ = CURRENT_LOCALE.set(locale);
}

/// Returns the current CLI locale (defaults to English).
#[must_use]
pub fn current_locale() -> Locale {
    CURRENT_LOCALE.get().copied().unwrap_or(Locale::En)
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// English catalog.
const CATALOG_EN: &[(&str, &str)] = &[
    ("main.version", "pkgcheck {version}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "output"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
    ("output.json_failed", "Failed to render JSON output: {error}"),
    ("config.load_failed", "Failed to load config: {error}"),
    ("config.validate.ok", "Config is valid."),
    ("settings.invalid", "Invalid target setting: {error}"),
    ("host.invalid", "Invalid host setting: {error}"),
    ("reference.missing", "No package reference given. Pass --reference or set {env}."),
    ("reference.invalid", "Invalid package reference {value}: {error}"),
    ("plan.invalid", "Invalid test plan: {error}"),
    ("layout.invalid", "Failed to compute the build layout: {error}"),
    ("layout.source", "Source directory: {path}"),
    ("layout.build", "Build directory: {path}"),
    ("layout.generators", "Generators directory: {path}"),
    ("layout.bindir", "Binary directory: {path}"),
    ("layout.binary", "Test binary: {path}"),
    ("test.failed", "Package test failed at stage {stage}: {error}"),
    ("test.summary.tested", "Tested package: {reference}"),
    ("test.summary.capability", "Execution capability: {capability}"),
    ("test.summary.binary", "Test binary: {path}"),
    ("test.summary.passed", "Test binary passed (exit code {code})."),
    (
        "test.summary.skipped",
        "Test binary built but not executed: the host cannot run it ({reason}).",
    ),
    ("can_run.verdict", "Capability: {capability}"),
    ("can_run.yes", "This host can run binaries built for {target}."),
    ("can_run.no", "This host cannot run binaries built for {target} ({reason})."),
    ("can_run.emulator", "Emulator: {command}"),
    ("i18n.lang.invalid_env", "Invalid value for {env}: {value}. Expected 'en' or 'ca'."),
    (
        "i18n.disclaimer.machine_translated",
        "Note: non-English output is machine-translated and may be inaccurate.",
    ),
];

/// Catalan catalog.
const CATALOG_CA: &[(&str, &str)] = &[
    ("main.version", "pkgcheck {version}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "sortida"),
    ("output.write_failed", "No s'ha pogut escriure a {stream}: {error}"),
    ("output.json_failed", "No s'ha pogut generar la sortida JSON: {error}"),
    ("config.load_failed", "No s'ha pogut carregar la configuració: {error}"),
    ("config.validate.ok", "La configuració és vàlida."),
    ("settings.invalid", "Paràmetre de destinació no vàlid: {error}"),
    ("host.invalid", "Paràmetre d'amfitrió no vàlid: {error}"),
    (
        "reference.missing",
        "No s'ha indicat cap referència de paquet. Useu --reference o definiu {env}.",
    ),
    ("reference.invalid", "Referència de paquet no vàlida {value}: {error}"),
    ("plan.invalid", "Pla de prova no vàlid: {error}"),
    ("layout.invalid", "No s'ha pogut calcular la disposició de compilació: {error}"),
    ("layout.source", "Directori de fonts: {path}"),
    ("layout.build", "Directori de compilació: {path}"),
    ("layout.generators", "Directori de generadors: {path}"),
    ("layout.bindir", "Directori de binaris: {path}"),
    ("layout.binary", "Binari de prova: {path}"),
    ("test.failed", "La prova del paquet ha fallat a l'etapa {stage}: {error}"),
    ("test.summary.tested", "Paquet provat: {reference}"),
    ("test.summary.capability", "Capacitat d'execució: {capability}"),
    ("test.summary.binary", "Binari de prova: {path}"),
    ("test.summary.passed", "El binari de prova ha passat (codi de sortida {code})."),
    (
        "test.summary.skipped",
        "El binari de prova s'ha compilat però no s'ha executat: l'amfitrió no el pot executar \
         ({reason}).",
    ),
    ("can_run.verdict", "Capacitat: {capability}"),
    ("can_run.yes", "Aquest amfitrió pot executar binaris compilats per a {target}."),
    ("can_run.no", "Aquest amfitrió no pot executar binaris compilats per a {target} ({reason})."),
    ("can_run.emulator", "Emulador: {command}"),
    ("i18n.lang.invalid_env", "Valor no vàlid per a {env}: {value}. S'esperava 'en' o 'ca'."),
    (
        "i18n.disclaimer.machine_translated",
        "Nota: la sortida que no és en anglès està traduïda automàticament i pot ser inexacta.",
    ),
];

/// Returns the raw catalog entries for a locale.
#[cfg(test)]
pub(crate) const fn catalog_entries_for(locale: Locale) -> &'static [(&'static str, &'static str)] {
    match locale {
        Locale::En => CATALOG_EN,
        Locale::Ca => CATALOG_CA,
    }
}

/// Returns the message catalog for the requested locale.
pub(crate) fn catalog_for(locale: Locale) -> &'static HashMap<&'static str, &'static str> {
    static CATALOG_EN_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    static CATALOG_CA_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    match locale {
        Locale::En => CATALOG_EN_MAP.get_or_init(|| CATALOG_EN.iter().copied().collect()),
        Locale::Ca => CATALOG_CA_MAP.get_or_init(|| CATALOG_CA.iter().copied().collect()),
    }
}

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Translates `key` using the selected locale while substituting `args`.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    let template = catalog_for(current_locale())
        .get(key)
        .copied()
        .or_else(|| catalog_for(Locale::En).get(key).copied())
        .unwrap_or(key);
    substitute(template, &args)
}

/// Replaces `{placeholder}` positions in a single pass over `template`.
///
/// Substituted values are never rescanned; unknown placeholders are kept.
pub(crate) fn substitute(template: &str, args: &[MessageArg]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;
    while let Some((before, after)) = rest.split_once('{') {
        result.push_str(before);
        let Some((name, tail)) = after.split_once('}') else {
            result.push('{');
            rest = after;
            break;
        };
        match args.iter().find(|arg| arg.key == name) {
            Some(arg) => result.push_str(&arg.value),
            None => {
                result.push('{');
                result.push_str(name);
                result.push('}');
            }
        }
        rest = tail;
    }
    result.push_str(rest);
    result
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Formats a localized message from a key and named arguments.
///
/// Named arguments are substituted into `{placeholder}` positions.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::i18n::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::i18n::translate($key, args)
    }};
}
