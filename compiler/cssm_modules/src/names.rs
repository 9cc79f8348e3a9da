//! Scoped name generators.
//!
//! A generator turns `(local name, file path, file source)` into the
//! external name a local class, id, or keyframes name is exported as.
//! Generators are pure; [`NameCache`] memoises one explicitly when the
//! caller wants names to survive across sheets.

use std::fmt;
use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use sha2::{Digest, Sha256, Sha512};

/// Derives the external name for a local name.
pub trait ScopedNameGenerator: Send + Sync + fmt::Debug {
    fn generate(&self, local: &str, path: &str, source: &str) -> String;
}

/// `_<sanitized path>__<local>`.
#[derive(Copy, Clone, Debug, Default)]
pub struct PathScoped;

impl ScopedNameGenerator for PathScoped {
    fn generate(&self, local: &str, path: &str, _source: &str) -> String {
        format!("_{}__{local}", sanitize_path(path))
    }
}

/// Drop the extension, collapse runs of non-alphanumerics to `_`, and trim
/// one `_` from either end.
pub fn sanitize_path(path: &str) -> String {
    let stem = match path.rfind(['.', '/', '\\']) {
        Some(dot) if path[dot..].starts_with('.') && dot + 1 < path.len() => &path[..dot],
        _ => path,
    };
    let mut out = String::with_capacity(stem.len());
    for c in stem.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c);
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    let out = out.strip_prefix('_').unwrap_or(&out);
    out.strip_suffix('_').unwrap_or(out).to_owned()
}

/// `_<local>_<hash of the source in base 36>_<line>`, where `line` is the
/// first line mentioning `.<local>`.
#[derive(Copy, Clone, Debug, Default)]
pub struct ContentHash;

impl ScopedNameGenerator for ContentHash {
    fn generate(&self, local: &str, _path: &str, source: &str) -> String {
        let line = source.find(&format!(".{local}")).map_or(1, |at| {
            1 + source.as_bytes()[..at]
                .iter()
                .filter(|&&b| b == b'\n' || b == b'\r')
                .count()
        });
        let hash = to_base36(string_hash(source));
        let hash = &hash[..hash.len().min(5)];
        format!("_{local}_{hash}_{line}")
    }
}

/// `<local>__<first 8 characters of base64(sha256(path))>`.
#[derive(Copy, Clone, Debug, Default)]
pub struct FilenameHash;

impl ScopedNameGenerator for FilenameHash {
    fn generate(&self, local: &str, path: &str, _source: &str) -> String {
        let digest = URL_SAFE_NO_PAD.encode(Sha256::digest(path.as_bytes()));
        format!("{local}__{}", &digest[..8])
    }
}

/// djb2 over UTF-16 code units, last to first, xor variant.
pub fn string_hash(text: &str) -> u32 {
    let units: Vec<u16> = text.encode_utf16().collect();
    let mut hash: i32 = 5381;
    for &unit in units.iter().rev() {
        hash = hash.wrapping_mul(33) ^ i32::from(unit);
    }
    u32::from_ne_bytes(hash.to_ne_bytes())
}

fn to_base36(mut n: u32) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut out = Vec::new();
    loop {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
        if n == 0 {
            break;
        }
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum HashAlgorithm {
    Sha256,
    Sha512,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum DigestEncoding {
    Hex,
    Base64,
}

/// Interpolates a pattern such as `[name]__[local]___[hash:base64:5]`.
///
/// | Placeholder | Value |
/// |---|---|
/// | `[local]` | the local name |
/// | `[name]` | file name without extension |
/// | `[ext]` | extension without the dot |
/// | `[folder]` | name of the containing directory |
/// | `[path]` | directory relative to the context, with a trailing `/` |
/// | `[hash]`, `[hash:<len>]`, `[hash:<digest>:<len>]`, `[hash:<algo>:<digest>:<len>]` | digest of `hash_prefix + relative path + "+" + local` |
///
/// `algo` is `sha256` (default) or `sha512`; `digest` is `hex` (default)
/// or `base64`. Characters that cannot appear in an identifier become `_`.
#[derive(Clone, Debug)]
pub struct Template {
    pattern: String,
    hash_prefix: String,
    context: Option<String>,
}

impl Template {
    pub fn new(pattern: impl Into<String>) -> Self {
        Template {
            pattern: pattern.into(),
            hash_prefix: String::new(),
            context: None,
        }
    }

    #[must_use]
    pub fn with_hash_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.hash_prefix = prefix.into();
        self
    }

    /// Directory paths are made relative to.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    fn relative<'p>(&self, path: &'p str) -> &'p str {
        let relative = self
            .context
            .as_deref()
            .and_then(|ctx| path.strip_prefix(ctx.trim_end_matches('/')))
            .unwrap_or(path);
        relative.trim_start_matches('/')
    }

    fn hash(&self, format: &str, relative: &str, local: &str) -> String {
        let mut algorithm = HashAlgorithm::Sha256;
        let mut encoding = DigestEncoding::Hex;
        let mut length = None;
        for part in format.split(':').filter(|p| !p.is_empty()) {
            match part {
                "sha256" => algorithm = HashAlgorithm::Sha256,
                "sha512" => algorithm = HashAlgorithm::Sha512,
                "hex" => encoding = DigestEncoding::Hex,
                "base64" => encoding = DigestEncoding::Base64,
                _ => {
                    if let Ok(n) = part.parse::<usize>() {
                        length = Some(n);
                    }
                }
            }
        }

        let content = format!("{}{relative}+{local}", self.hash_prefix);
        let bytes = match algorithm {
            HashAlgorithm::Sha256 => Sha256::digest(content.as_bytes()).to_vec(),
            HashAlgorithm::Sha512 => Sha512::digest(content.as_bytes()).to_vec(),
        };
        let mut digest = match encoding {
            DigestEncoding::Hex => bytes.iter().map(|b| format!("{b:02x}")).collect(),
            DigestEncoding::Base64 => URL_SAFE_NO_PAD.encode(&bytes),
        };
        if let Some(n) = length {
            digest.truncate(n);
        }
        digest
    }
}

impl ScopedNameGenerator for Template {
    fn generate(&self, local: &str, path: &str, _source: &str) -> String {
        let relative = self.relative(path);
        let (dir, file) = relative.rsplit_once('/').unwrap_or(("", relative));
        let (name, ext) = match file.rsplit_once('.') {
            Some((name, ext)) if !name.is_empty() => (name, ext),
            _ => (file, ""),
        };
        let folder = dir.rsplit('/').next().unwrap_or("");

        let mut out = String::with_capacity(self.pattern.len() + local.len());
        let mut rest = self.pattern.as_str();
        while let Some(open) = rest.find('[') {
            out.push_str(&rest[..open]);
            let Some(close) = rest[open..].find(']').map(|c| open + c) else {
                break;
            };
            let placeholder = &rest[open + 1..close];
            match placeholder {
                "local" => out.push_str(local),
                "name" => out.push_str(name),
                "ext" => out.push_str(ext),
                "folder" => out.push_str(folder),
                "path" => {
                    if !dir.is_empty() {
                        out.push_str(dir);
                        out.push('/');
                    }
                }
                _ if placeholder == "hash" || placeholder.starts_with("hash:") => {
                    out.push_str(&self.hash(&placeholder[4..], relative, local));
                }
                _ => out.push_str(&rest[open..=close]),
            }
            rest = &rest[close + 1..];
        }
        out.push_str(rest);
        to_identifier(&out)
    }
}

/// Replace characters an identifier cannot hold, and keep it from
/// starting with a digit.
fn to_identifier(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' || !c.is_ascii() {
                c
            } else {
                '_'
            }
        })
        .collect();
    let digit_start = out.starts_with(|c: char| c.is_ascii_digit())
        || (out.starts_with('-') && out[1..].starts_with(|c: char| c.is_ascii_digit() || c == '-'));
    if digit_start {
        out.insert(0, '_');
    }
    out
}

/// Memoises another generator by `(path, local)`.
///
/// Shared by reference: every sheet processed with the same cache gets the
/// same name for the same local in the same file.
pub struct NameCache {
    inner: Arc<dyn ScopedNameGenerator>,
    names: RwLock<FxHashMap<(String, String), String>>,
}

impl NameCache {
    pub fn new(inner: Arc<dyn ScopedNameGenerator>) -> Self {
        NameCache {
            inner,
            names: RwLock::new(FxHashMap::default()),
        }
    }

    pub fn len(&self) -> usize {
        self.names.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.read().is_empty()
    }

    pub fn clear(&self) {
        self.names.write().clear();
    }
}

impl fmt::Debug for NameCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NameCache")
            .field("inner", &self.inner)
            .field("len", &self.len())
            .finish()
    }
}

impl ScopedNameGenerator for NameCache {
    fn generate(&self, local: &str, path: &str, source: &str) -> String {
        let key = (path.to_owned(), local.to_owned());
        if let Some(name) = self.names.read().get(&key) {
            return name.clone();
        }
        let name = self.inner.generate(local, path, source);
        self.names.write().entry(key).or_insert(name).clone()
    }
}
