//! The interactive command harness: maps textual operations read from an
//! input stream onto a tree variant chosen at startup, and reports timing
//! and counter statistics when the stream ends.
//!
//! Everything here is a thin wrapper over the tree surface; domain outcomes
//! (key present or absent) stay booleans, and only malformed input or I/O
//! trouble surfaces as an [`Error`].
//!
//! # Examples
//!
//! ```
//! use std::io::Cursor;
//! use ordtree::driver::{run, KeyKind, Variant};
//!
//! let script = "2\ninsert 5\nsearch 5\n";
//! let mut output = Vec::new();
//! run(Variant::RedBlack, KeyKind::Int, Cursor::new(script), &mut output).unwrap();
//!
//! let text = String::from_utf8(output).unwrap();
//! assert!(text.contains("Number of insertions: 1"));
//! ```

use std::collections::VecDeque;
use std::fmt::Display;
use std::io::{self, BufRead, Write};
use std::str::FromStr;
use std::time::Instant;

use crate::bst;
use crate::redblack;
use crate::splay;

/// Which tree variant backs a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Variant {
    /// The unbalanced baseline.
    Bst,
    /// The red-black tree.
    RedBlack,
    /// The splay tree.
    Splay,
}

impl FromStr for Variant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "bst" => Ok(Variant::Bst),
            "rbt" => Ok(Variant::RedBlack),
            "splay" => Ok(Variant::Splay),
            other => Err(Error::UnknownVariant(other.to_string())),
        }
    }
}

/// How keys read from the input are interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyKind {
    /// Keys are arbitrary whitespace-free strings, ordered lexicographically.
    Text,
    /// Keys are signed 64-bit integers.
    Int,
}

impl FromStr for KeyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "text" => Ok(KeyKind::Text),
            "int" => Ok(KeyKind::Int),
            other => Err(Error::UnknownKeyKind(other.to_string())),
        }
    }
}

/// Failures surfaced by the driver layer. Unknown operations and malformed
/// keys inside a running session are reported to the output stream and the
/// session continues; these errors are for problems the session cannot
/// recover from.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading the input or writing the output failed.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// The value after `--type` names no tree variant.
    #[error("unknown tree variant `{0}` (supported: bst|rbt|splay)")]
    UnknownVariant(String),
    /// The value after `--key` names no key kind.
    #[error("unknown key kind `{0}` (supported: text|int)")]
    UnknownKeyKind(String),
    /// Required command line arguments are missing.
    #[error("usage: ordtree --type bst|rbt|splay [--key text|int]")]
    Usage,
}

/// One tree of any variant behind the common surface. The driver dispatches
/// through this so a session is generic over the variant picked at runtime.
enum AnyTree<K> {
    Bst(bst::Tree<K>),
    RedBlack(redblack::Tree<K>),
    Splay(splay::Tree<K>),
}

impl<K: Ord + 'static> AnyTree<K> {
    fn new(variant: Variant) -> Self {
        match variant {
            Variant::Bst => AnyTree::Bst(bst::Tree::new()),
            Variant::RedBlack => AnyTree::RedBlack(redblack::Tree::new()),
            Variant::Splay => AnyTree::Splay(splay::Tree::new()),
        }
    }
}

impl<K> AnyTree<K> {
    fn insert(&mut self, key: K) -> bool {
        match self {
            AnyTree::Bst(t) => t.insert(key),
            AnyTree::RedBlack(t) => t.insert(key),
            AnyTree::Splay(t) => t.insert(key),
        }
    }

    fn remove(&mut self, key: &K) -> bool {
        match self {
            AnyTree::Bst(t) => t.remove(key),
            AnyTree::RedBlack(t) => t.remove(key),
            AnyTree::Splay(t) => t.remove(key),
        }
    }

    // Takes `&mut self` uniformly: searching a splay tree reshapes it.
    fn search(&mut self, key: &K) -> bool {
        match self {
            AnyTree::Bst(t) => t.search(key),
            AnyTree::RedBlack(t) => t.search(key),
            AnyTree::Splay(t) => t.search(key),
        }
    }

    fn clear(&mut self)
    where
        K: Clone,
    {
        match self {
            AnyTree::Bst(t) => t.clear(),
            AnyTree::RedBlack(t) => t.clear(),
            AnyTree::Splay(t) => t.clear(),
        }
    }

    fn inorder(&self) -> Vec<&K> {
        match self {
            AnyTree::Bst(t) => t.inorder(),
            AnyTree::RedBlack(t) => t.inorder(),
            AnyTree::Splay(t) => t.inorder(),
        }
    }

    fn levelorder(&self) -> Vec<Option<&K>> {
        match self {
            AnyTree::Bst(t) => t.levelorder(),
            AnyTree::RedBlack(t) => t.levelorder(),
            AnyTree::Splay(t) => t.levelorder(),
        }
    }

    fn comparisons(&self) -> u64 {
        match self {
            AnyTree::Bst(t) => t.comparisons(),
            AnyTree::RedBlack(t) => t.comparisons(),
            AnyTree::Splay(t) => t.comparisons(),
        }
    }

    fn modifications(&self) -> u64 {
        match self {
            AnyTree::Bst(t) => t.modifications(),
            AnyTree::RedBlack(t) => t.modifications(),
            AnyTree::Splay(t) => t.modifications(),
        }
    }
}

/// Whitespace-separated tokens pulled from a reader, crossing line
/// boundaries the way stream extraction does.
struct Tokens<R> {
    reader: R,
    pending: VecDeque<String>,
}

impl<R: BufRead> Tokens<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            pending: VecDeque::new(),
        }
    }

    fn next(&mut self) -> io::Result<Option<String>> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Ok(Some(token));
            }
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.pending
                .extend(line.split_whitespace().map(str::to_owned));
        }
    }
}

/// Statistics record for one accepted operation: name, elapsed
/// milliseconds, and the counter deltas it caused.
struct Partial {
    op: String,
    millis: f64,
    comparisons: f64,
    modifications: f64,
}

#[derive(Default)]
struct Stats {
    inserts: u64,
    searches: u64,
    deletes: u64,
    inorders: u64,
    size: i64,
    max_size: i64,
    partials: Vec<Partial>,
}

impl Stats {
    fn inserted(&mut self, added: bool) {
        if added {
            self.size += 1;
            self.max_size = self.max_size.max(self.size);
        }
        self.inserts += 1;
    }

    fn deleted(&mut self, removed: bool) {
        if removed {
            self.size -= 1;
            debug_assert!(self.size >= 0, "size went negative");
        }
        self.deletes += 1;
    }
}

fn format_partials(partials: &[Partial]) -> String {
    let mut out = String::from("[");
    for (i, p) in partials.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&format!(
            "({}, {:.3}, {}, {})",
            p.op, p.millis, p.comparisons, p.modifications
        ));
    }
    out.push(']');
    out
}

fn print_help<W: Write>(output: &mut W) -> io::Result<()> {
    writeln!(
        output,
        "Enter operation: insert x | delete x | search x | inorder | levelorder | \
         load filename | load_search filename | load_delete filename | clear | size | help"
    )
}

/// Reads whitespace-separated keys from a file, stopping at the first token
/// that fails to parse.
fn load_keys<K: FromStr>(path: &str) -> io::Result<Vec<K>> {
    let text = std::fs::read_to_string(path)?;
    Ok(text
        .split_whitespace()
        .map_while(|token| token.parse().ok())
        .collect())
}

/// Runs a full session: reads the operation budget, then executes commands
/// from `input` until the budget or the input runs out, and writes the
/// closing report to `output`.
pub fn run<R, W>(variant: Variant, kind: KeyKind, input: R, output: &mut W) -> Result<(), Error>
where
    R: BufRead,
    W: Write,
{
    match kind {
        KeyKind::Text => session::<String, R, W>(variant, input, output),
        KeyKind::Int => session::<i64, R, W>(variant, input, output),
    }
}

fn session<K, R, W>(variant: Variant, input: R, output: &mut W) -> Result<(), Error>
where
    K: Ord + Clone + Display + FromStr + 'static,
    R: BufRead,
    W: Write,
{
    let mut tree = AnyTree::<K>::new(variant);
    let mut tokens = Tokens::new(input);

    writeln!(output, "Enter number of operations")?;
    let ops: i64 = match tokens.next()?.and_then(|t| t.parse().ok()) {
        Some(n) => n,
        None => {
            writeln!(output, "Wrong input")?;
            return Ok(());
        }
    };

    print_help(output)?;

    let mut stats = Stats::default();
    let start = Instant::now();
    let mut last_time = start;
    let mut last_comparisons = 0u64;
    let mut last_modifications = 0u64;

    let mut iterations: i64 = 0;
    while ops < 0 || iterations < ops {
        iterations += 1;
        let op = match tokens.next()? {
            Some(op) => op,
            None => break,
        };

        let executed = match op.as_str() {
            "insert" | "delete" | "search" => match tokens.next()? {
                Some(token) => match token.parse::<K>() {
                    Ok(key) => {
                        match op.as_str() {
                            "insert" => stats.inserted(tree.insert(key)),
                            "delete" => stats.deleted(tree.remove(&key)),
                            _ => {
                                let found = tree.search(&key);
                                stats.searches += 1;
                                writeln!(output, "{}", found as i32)?;
                            }
                        }
                        true
                    }
                    Err(_) => {
                        writeln!(output, "Wrong arguments")?;
                        false
                    }
                },
                None => {
                    writeln!(output, "Wrong arguments")?;
                    false
                }
            },
            "load" | "load_search" | "load_delete" => match tokens.next()? {
                Some(filename) => {
                    match load_keys::<K>(&filename) {
                        Ok(keys) => {
                            log::debug!("loaded {} keys from {}", keys.len(), filename);
                            for key in keys {
                                match op.as_str() {
                                    "load" => stats.inserted(tree.insert(key)),
                                    "load_search" => {
                                        tree.search(&key);
                                        stats.searches += 1;
                                    }
                                    _ => stats.deleted(tree.remove(&key)),
                                }
                            }
                        }
                        Err(err) => {
                            log::debug!("opening {} failed: {}", filename, err);
                            writeln!(output, "Couldn't open file")?;
                        }
                    }
                    true
                }
                None => {
                    writeln!(output, "Wrong arguments")?;
                    false
                }
            },
            "clear" => {
                tree.clear();
                stats.size = 0;
                true
            }
            "size" => {
                writeln!(output, "{}", stats.size)?;
                true
            }
            "inorder" => {
                stats.inorders += 1;
                for key in tree.inorder() {
                    write!(output, "{} ", key)?;
                }
                writeln!(output)?;
                true
            }
            "levelorder" => {
                print_levels(output, &tree.levelorder())?;
                true
            }
            "help" => {
                print_help(output)?;
                true
            }
            _ => {
                writeln!(output, "Wrong operation")?;
                continue;
            }
        };

        if executed {
            let now = Instant::now();
            let comparisons = tree.comparisons();
            let modifications = tree.modifications();
            stats.partials.push(Partial {
                op,
                millis: now.duration_since(last_time).as_secs_f64() * 1e3,
                comparisons: (comparisons - last_comparisons) as f64,
                modifications: (modifications - last_modifications) as f64,
            });
            last_time = now;
            last_comparisons = comparisons;
            last_modifications = modifications;
        }
    }

    writeln!(
        output,
        "Time: {:.3}ms",
        start.elapsed().as_secs_f64() * 1e3
    )?;
    writeln!(output, "Number of insertions: {}", stats.inserts)?;
    writeln!(output, "Number of searches: {}", stats.searches)?;
    writeln!(output, "Number of deletions: {}", stats.deletes)?;
    writeln!(output, "Number of inorders: {}", stats.inorders)?;
    writeln!(output, "Number of comparisons: {}", tree.comparisons())?;
    writeln!(output, "Number of modifications: {}", tree.modifications())?;
    writeln!(output, "Partial results: {}", format_partials(&stats.partials))?;

    let per_insert = stats.inserts.max(1) as f64;
    let normalized: Vec<Partial> = stats
        .partials
        .iter()
        .map(|p| Partial {
            op: p.op.clone(),
            // Microseconds per insertion, matching the raw line's scale.
            millis: p.millis / per_insert * 1e3,
            comparisons: p.comparisons / per_insert,
            modifications: p.modifications / per_insert,
        })
        .collect();
    writeln!(
        output,
        "Partial results per one op: {}",
        format_partials(&normalized)
    )?;
    writeln!(output, "Max size: {}", stats.max_size)?;
    writeln!(output, "Current size: {}", stats.size)?;

    Ok(())
}

/// Prints a level-order sequence one tree level per line, `_` marking the
/// absent slots.
fn print_levels<W: Write, K: Display>(output: &mut W, slots: &[Option<&K>]) -> io::Result<()> {
    let mut width = 1;
    let mut index = 0;
    while index < slots.len() {
        let end = (index + width).min(slots.len());
        for slot in &slots[index..end] {
            match slot {
                Some(key) => write!(output, "{} ", key)?,
                None => write!(output, "_ ")?,
            }
        }
        writeln!(output)?;
        index = end;
        width *= 2;
    }
    Ok(())
}
