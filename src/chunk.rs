//! Overlapping-window text chunker.
//!
//! Splits document text into windows of a configurable character size
//! (default 500) with a configurable overlap (default 50). Each window
//! end is pulled back to the coarsest boundary found near the size limit:
//! paragraph, then line, then word, then character. Chunks carry a
//! `[Source: <path>]` annotation line and contiguous zero-based indices.

use std::path::PathBuf;

use crate::config::ChunkingConfig;
use crate::models::Chunk;

/// Reserved source label for the synthetic file-listing chunk set.
pub const FILE_INDEX_SOURCE: &str = "indexing files";

/// Split text into overlapping windows of at most `chunk_size` characters.
///
/// Consecutive windows share `overlap` characters. Empty input yields an
/// empty result. Text short enough for one window is returned verbatim.
pub fn split_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let total = chars.len();
    if total == 0 || chunk_size == 0 {
        return Vec::new();
    }
    if total <= chunk_size {
        return vec![text.to_string()];
    }

    let overlap = overlap.min(chunk_size - 1);
    let mut out = Vec::new();
    let mut start = 0usize;
    loop {
        let hard_end = (start + chunk_size).min(total);
        let end = if hard_end == total {
            total
        } else {
            find_break_point(&chars, start, hard_end)
        };

        out.push(chars[start..end].iter().collect());

        if end >= total {
            break;
        }
        // Step back `overlap` characters for the next window, but always
        // make forward progress.
        start = end.saturating_sub(overlap).max(start + 1);
    }

    out
}

/// Find a boundary near `target_end`, preferring paragraph breaks, then
/// line breaks, then word breaks. Only the last fifth of the window is
/// searched so chunks stay near full size. Returns an index in
/// `(start, target_end]`; the separator stays with the earlier chunk.
fn find_break_point(chars: &[char], start: usize, target_end: usize) -> usize {
    let window = target_end - start;
    let search_start = target_end.saturating_sub(window / 5).max(start + 1);

    // Paragraph break
    for i in (search_start..target_end).rev() {
        if chars[i] == '\n' && i > start && chars[i - 1] == '\n' {
            return i + 1;
        }
    }

    // Line break
    for i in (search_start..target_end).rev() {
        if chars[i] == '\n' {
            return i + 1;
        }
    }

    // Word break
    for i in (search_start..target_end).rev() {
        if chars[i] == ' ' {
            return i + 1;
        }
    }

    target_end
}

/// Split a document into [`Chunk`]s tagged with their source and a
/// sequential index. Whitespace-only input yields no chunks.
pub fn chunk_document(text: &str, source: &str, config: &ChunkingConfig) -> Vec<Chunk> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    split_text(text, config.chunk_size, config.overlap)
        .into_iter()
        .enumerate()
        .map(|(i, piece)| Chunk {
            content: format!("[Source: {}]\n\n{}", source, piece),
            source: source.to_string(),
            index: i as i64,
        })
        .collect()
}

/// Build the synthetic chunk set describing which files were indexed, so
/// the retrieval layer can answer questions like "what files are
/// available". Tagged with the reserved [`FILE_INDEX_SOURCE`] label.
pub fn file_index_chunks(files: &[PathBuf], config: &ChunkingConfig) -> Vec<Chunk> {
    if files.is_empty() {
        return Vec::new();
    }

    let listing: Vec<String> = files.iter().map(|p| p.display().to_string()).collect();
    let text = format!("The following files were indexed:\n{}", listing.join("\n"));

    split_text(&text, config.chunk_size, config.overlap)
        .into_iter()
        .enumerate()
        .map(|(i, piece)| Chunk {
            content: piece,
            source: FILE_INDEX_SOURCE.to_string(),
            index: i as i64,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(chunk_size: usize, overlap: usize) -> ChunkingConfig {
        ChunkingConfig {
            chunk_size,
            overlap,
        }
    }

    #[test]
    fn short_text_is_a_single_chunk() {
        let chunks = chunk_document("Hello, world!", "a.txt", &config(500, 50));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].index, 0);
        assert_eq!(chunks[0].source, "a.txt");
        assert_eq!(chunks[0].content, "[Source: a.txt]\n\nHello, world!");
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        assert!(chunk_document("", "a.txt", &config(500, 50)).is_empty());
        assert!(chunk_document("   \n\n  ", "a.txt", &config(500, 50)).is_empty());
        assert!(split_text("", 500, 50).is_empty());
    }

    #[test]
    fn indices_are_contiguous_from_zero() {
        let text = (0..60)
            .map(|i| format!("Sentence number {}.", i))
            .collect::<Vec<_>>()
            .join(" ");
        let chunks = chunk_document(&text, "doc.txt", &config(100, 10));
        assert!(chunks.len() > 1);
        for (i, c) in chunks.iter().enumerate() {
            assert_eq!(c.index, i as i64, "index mismatch at position {}", i);
        }
    }

    #[test]
    fn windows_respect_the_size_limit() {
        let text = "word ".repeat(400);
        for piece in split_text(&text, 120, 20) {
            assert!(
                piece.chars().count() <= 120,
                "window of {} chars exceeds limit",
                piece.chars().count()
            );
        }
    }

    #[test]
    fn hard_splits_reconstruct_the_original() {
        // No spaces or newlines, so every break lands exactly on the size
        // limit and stripping the overlap rebuilds the input.
        let text: String = "0123456789".repeat(10);
        let overlap = 5;
        let pieces = split_text(&text, 20, overlap);
        assert!(pieces.len() > 1);

        let mut rebuilt = pieces[0].clone();
        for piece in &pieces[1..] {
            rebuilt.push_str(&piece[overlap..]);
        }
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn no_content_is_lost_at_boundaries() {
        let text = (0..80)
            .map(|i| format!("token{}", i))
            .collect::<Vec<_>>()
            .join(" ");
        let pieces = split_text(&text, 90, 15);
        let joined = pieces.join("");
        for i in 0..80 {
            let token = format!("token{}", i);
            assert!(joined.contains(&token), "lost {}", token);
        }
    }

    #[test]
    fn consecutive_windows_share_the_overlap() {
        let text: String = "abcdefghij".repeat(20);
        let overlap = 8;
        let pieces = split_text(&text, 40, overlap);
        for pair in pieces.windows(2) {
            let tail: String = pair[0].chars().rev().take(overlap).collect::<Vec<_>>()
                .into_iter().rev().collect();
            assert!(pair[1].starts_with(&tail));
        }
    }

    #[test]
    fn prefers_paragraph_boundaries() {
        let text = format!("{}\n\n{}", "a".repeat(95), "b".repeat(200));
        let pieces = split_text(&text, 100, 0);
        assert!(pieces[0].ends_with("\n\n"), "first window should stop after the paragraph break");
        assert!(pieces[1].starts_with('b'));
    }

    #[test]
    fn falls_back_to_word_boundaries() {
        let text = format!("{} {}", "a".repeat(95), "b".repeat(200));
        let pieces = split_text(&text, 100, 0);
        assert!(pieces[0].ends_with(' '));
        assert!(pieces[1].starts_with('b'));
    }

    #[test]
    fn splitting_is_deterministic() {
        let text = "Alpha beta gamma. ".repeat(60);
        let a = split_text(&text, 150, 30);
        let b = split_text(&text, 150, 30);
        assert_eq!(a, b);
    }

    #[test]
    fn unicode_text_does_not_panic() {
        let text = "héllo wörld 🦀 ".repeat(50);
        let pieces = split_text(&text, 60, 10);
        assert!(!pieces.is_empty());
        for piece in &pieces {
            assert!(piece.chars().count() <= 60);
        }
    }

    #[test]
    fn file_index_lists_every_file() {
        let files = vec![
            PathBuf::from("data/a.txt"),
            PathBuf::from("data/sub/b.pdf"),
        ];
        let chunks = file_index_chunks(&files, &config(500, 50));
        assert!(!chunks.is_empty());
        assert_eq!(chunks[0].source, FILE_INDEX_SOURCE);
        let joined: String = chunks.iter().map(|c| c.content.as_str()).collect();
        assert!(joined.contains("data/a.txt"));
        assert!(joined.contains("data/sub/b.pdf"));
    }

    #[test]
    fn file_index_of_nothing_is_empty() {
        assert!(file_index_chunks(&[], &config(500, 50)).is_empty());
    }
}
