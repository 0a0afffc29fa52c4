//! Splitting long replies into message-sized chunks
//!
//! Chunks are built from whole lines: a line is never split, and line order
//! is preserved across chunk boundaries. Lengths are counted in `char`s,
//! which is how Discord counts its message limit.

/// Hard per-message limit of the Discord API.
pub const DISCORD_MESSAGE_LIMIT: usize = 2000;

/// Default chunk budget, leaving headroom under [`DISCORD_MESSAGE_LIMIT`]
/// for code fences.
pub const DEFAULT_CHUNK_SIZE: usize = 1900;

const CODE_FENCE_OPEN: &str = "```\n";
const CODE_FENCE_CLOSE: &str = "\n```";

/// Pack `lines` into chunks of at most `max_len` characters, joining lines
/// within a chunk with `\n`.
///
/// A single line longer than `max_len` is emitted on its own, untruncated.
pub fn chunk<I, S>(lines: I, max_len: usize) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut chunks = Vec::new();
    // (text, char count) of the chunk being filled; `None` until a line is
    // taken, so an empty line still opens a chunk
    let mut current: Option<(String, usize)> = None;

    for line in lines {
        let line = line.as_ref();
        let line_len = line.chars().count();

        current = match current.take() {
            None => Some((line.to_string(), line_len)),
            Some((text, len)) if len + 1 + line_len > max_len => {
                chunks.push(text);
                Some((line.to_string(), line_len))
            }
            Some((mut text, len)) => {
                text.push('\n');
                text.push_str(line);
                Some((text, len + 1 + line_len))
            }
        };
    }

    if let Some((text, _)) = current {
        chunks.push(text);
    }

    chunks
}

/// Wrap text in a markdown code block.
pub fn code_block(body: &str) -> String {
    format!("{CODE_FENCE_OPEN}{body}{CODE_FENCE_CLOSE}")
}

/// Composes a header plus a list of lines into the messages to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkFormatter {
    max_len: usize,
}

impl Default for ChunkFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}

impl ChunkFormatter {
    pub fn new(max_len: usize) -> Self {
        Self {
            max_len: max_len.max(1),
        }
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// See [`chunk`].
    pub fn chunk<I, S>(&self, lines: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        chunk(lines, self.max_len)
    }

    /// Build the outgoing messages for `header` followed by `lines`.
    ///
    /// When everything fits in one budget the result is a single message with
    /// the lines in a code block under the header. Otherwise the header is
    /// sent alone and every chunk becomes its own code-block message.
    pub fn compose<S: AsRef<str>>(&self, header: Option<&str>, lines: &[S]) -> Vec<String> {
        if lines.is_empty() {
            return header.map(|h| vec![h.to_string()]).unwrap_or_default();
        }

        let lines: Vec<&str> = lines.iter().map(|l| l.as_ref()).collect();
        let body_len = lines.iter().map(|l| l.chars().count()).sum::<usize>()
            + lines.len().saturating_sub(1);
        let header_len = header.map(|h| h.chars().count() + 1).unwrap_or(0);

        if header_len + body_len <= self.max_len {
            let block = code_block(&lines.join("\n"));
            return vec![match header {
                Some(h) => format!("{h}\n{block}"),
                None => block,
            }];
        }

        let mut messages = Vec::new();
        if let Some(h) = header {
            messages.push(h.to_string());
        }
        messages.extend(self.chunk(lines).into_iter().map(|c| code_block(&c)));
        messages
    }
}
