//! Closeable type and closing-method policy.
//!
//! The analyzer never hardcodes which types hold resources or which method
//! names release them; it consults an injected [`ClosePolicy`]. The default
//! table covers the common JDK-style streams, readers/writers, sockets, and
//! JDBC handles.

use once_cell::sync::Lazy;
use rustc_hash::FxHashSet;

/// Constructed type names recognized as closeable by default.
static DEFAULT_CLOSEABLE_TYPES: Lazy<FxHashSet<&'static str>> = Lazy::new(|| {
    [
        "FileInputStream",
        "FileOutputStream",
        "FileReader",
        "FileWriter",
        "BufferedInputStream",
        "BufferedOutputStream",
        "BufferedReader",
        "BufferedWriter",
        "InputStreamReader",
        "OutputStreamWriter",
        "PrintWriter",
        "PrintStream",
        "RandomAccessFile",
        "Socket",
        "ServerSocket",
        "Connection",
        "Statement",
        "PreparedStatement",
        "ResultSet",
        "Scanner",
        "Formatter",
    ]
    .into_iter()
    .collect()
});

/// Invoked member names that count as closing a resource by default.
static DEFAULT_CLOSE_METHODS: Lazy<FxHashSet<&'static str>> =
    Lazy::new(|| ["close", "shutdown", "release", "dispose"].into_iter().collect());

/// Decides which constructed types are tracked as resources and which
/// invoked member names release them.
#[derive(Debug, Clone)]
pub struct ClosePolicy {
    closeable_types: FxHashSet<String>,
    close_methods: FxHashSet<String>,
}

impl ClosePolicy {
    /// Build a policy from explicit tables.
    #[must_use]
    pub fn new(
        closeable_types: impl IntoIterator<Item = String>,
        close_methods: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            closeable_types: closeable_types.into_iter().collect(),
            close_methods: close_methods.into_iter().collect(),
        }
    }

    /// Whether a value of this declared type must be closed.
    #[must_use]
    pub fn is_closeable(&self, type_name: &str) -> bool {
        self.closeable_types.contains(type_name)
    }

    /// Whether invoking `method` on a resource of `type_name` closes it.
    #[must_use]
    pub fn closes(&self, type_name: &str, method: &str) -> bool {
        let _ = type_name;
        self.close_methods.contains(method)
    }
}

impl Default for ClosePolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_CLOSEABLE_TYPES.iter().map(|s| (*s).to_string()),
            DEFAULT_CLOSE_METHODS.iter().map(|s| (*s).to_string()),
        )
    }
}
