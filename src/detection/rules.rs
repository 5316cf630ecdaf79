//! Heuristic rule data and per-rule matching.
//!
//! Four independent rule families feed the classifier's cumulative score:
//! filename substrings, behavioral checks (size band, recency, double
//! extension), content byte patterns, and an extension denylist.

use regex::Regex;
use std::path::Path;
use std::time::{Duration, SystemTime};

/// Score contributed by a signature table hit.
pub const SCORE_HASH_MATCH: u32 = 10;
/// Score contributed by a filename substring match.
pub const SCORE_FILENAME: u32 = 5;
/// Score contributed by each behavioral indicator.
pub const SCORE_BEHAVIOR: u32 = 3;
/// Score contributed by each content pattern found.
pub const SCORE_CONTENT: u32 = 2;
/// Score contributed by a denylisted extension, at most once.
pub const SCORE_EXTENSION: u32 = 1;

/// Cumulative score at or above which a record is High Risk.
pub const THRESHOLD_HIGH: u32 = 10;
/// Cumulative score at or above which a record is Medium Risk.
pub const THRESHOLD_MEDIUM: u32 = 5;
/// Cumulative score at or above which a record is reported at all.
pub const THRESHOLD_LOW: u32 = 2;

/// Case-insensitive substrings flagged in file names.
const FILENAME_PATTERNS: &[&str] = &[
    "virus", "trojan", "malware", "keylog", "backdoor", "rootkit", "spyware", "ransom",
    "stealer", "botnet", "crack", "keygen", "hacktool", "worm", "miner",
];

/// Byte patterns searched in the first chunk of file content. Mostly Win32
/// API names associated with injection, download-and-execute, and keylogging.
const CONTENT_PATTERNS: &[&str] = &[
    "CreateRemoteThread",
    "VirtualAllocEx",
    "WriteProcessMemory",
    "SetWindowsHookEx",
    "GetAsyncKeyState",
    "URLDownloadToFile",
    "ShellExecuteA",
    "WinExec",
    "RegSetValueEx",
    "IsDebuggerPresent",
    "AdjustTokenPrivileges",
    "cmd.exe /c",
];

/// Extensions that score a denylist point.
const EXTENSION_DENYLIST: &[&str] = &[
    "scr", "pif", "com", "bat", "cmd", "vbs", "vbe", "js", "jse", "wsf", "wsh", "ps1",
    "hta", "cpl", "msc", "jar", "reg", "dll", "sys", "drv", "ocx", "msi", "msp", "mst",
    "lnk", "inf", "application", "gadget", "scf", "url",
];

/// Extensions treated as executable for the behavioral checks.
const EXECUTABLE_EXTENSIONS: &[&str] = &[
    "exe", "dll", "scr", "com", "bat", "cmd", "ps1", "vbs", "js", "msi", "sys", "pif",
];

/// Inner extensions that make a trailing executable extension a disguise
/// (e.g. `invoice.pdf.exe`).
const DECOY_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "txt", "jpg", "jpeg", "png",
    "gif", "mp3", "mp4", "avi", "zip",
];

/// Executables smaller than this are suspicious (stub droppers).
pub const MIN_EXECUTABLE_SIZE: u64 = 1024;
/// Executables larger than this are suspicious (padded binaries).
pub const MAX_EXECUTABLE_SIZE: u64 = 100 * 1024 * 1024;
/// Files created within this window count as recently dropped.
pub const RECENT_CREATION_WINDOW: Duration = Duration::from_secs(60 * 60);

/// Compiled filename rule set.
pub struct FilenameRules {
    pattern: Regex,
}

impl FilenameRules {
    /// Compile the built-in pattern list into one case-insensitive alternation.
    pub fn new() -> Self {
        let alternation = FILENAME_PATTERNS.join("|");
        let pattern = Regex::new(&format!("(?i)({})", alternation))
            .expect("built-in filename patterns must compile");
        Self { pattern }
    }

    /// Return the matched substring, if the file name hits any pattern.
    pub fn matches(&self, file_name: &str) -> Option<String> {
        self.pattern
            .find(file_name)
            .map(|m| m.as_str().to_lowercase())
    }
}

impl Default for FilenameRules {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether the extension is on the denylist.
pub fn is_denylisted_extension(ext: &str) -> bool {
    let ext = ext.to_lowercase();
    EXTENSION_DENYLIST.iter().any(|&e| e == ext)
}

/// Whether the extension marks an executable for behavioral purposes.
pub fn is_executable_extension(ext: &str) -> bool {
    let ext = ext.to_lowercase();
    EXECUTABLE_EXTENSIONS.iter().any(|&e| e == ext)
}

/// Extension of a path, lowercased, empty string if none.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Detect a document-style extension hidden before an executable one.
pub fn has_double_extension(path: &Path) -> bool {
    let ext = extension_of(path);
    if !is_executable_extension(&ext) {
        return false;
    }

    let stem = match path.file_stem() {
        Some(s) => s.to_string_lossy().to_lowercase(),
        None => return false,
    };

    match stem.rsplit('.').next() {
        Some(inner) if inner != stem => DECOY_EXTENSIONS.iter().any(|&e| e == inner),
        _ => false,
    }
}

/// Whether an executable's size falls outside the plausible band.
pub fn size_out_of_band(size: u64) -> bool {
    size < MIN_EXECUTABLE_SIZE || size > MAX_EXECUTABLE_SIZE
}

/// Whether the file was created within the recent-drop window.
///
/// Creation time is unavailable on some filesystems; those files simply
/// don't hit this rule.
pub fn created_recently(metadata: &std::fs::Metadata) -> bool {
    metadata
        .created()
        .ok()
        .and_then(|created| SystemTime::now().duration_since(created).ok())
        .map(|age| age < RECENT_CREATION_WINDOW)
        .unwrap_or(false)
}

/// Find all content patterns present in the given bytes.
///
/// Patterns are ASCII, so a lossy decode is enough for the search.
pub fn content_pattern_hits(data: &[u8]) -> Vec<&'static str> {
    let text = String::from_utf8_lossy(data);
    CONTENT_PATTERNS
        .iter()
        .filter(|p| text.contains(*p))
        .copied()
        .collect()
}
