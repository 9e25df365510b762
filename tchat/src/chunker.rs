//! Replays a finished reply as cumulative windows.

use std::time::Duration;

use async_stream::stream;
use futures_core::Stream;
use futures_timer::Delay;

use crate::StreamingChunk;

pub const CHUNK_SIZE: usize = 50;
pub const CHUNK_DELAY: Duration = Duration::from_millis(30);

/// Cumulative prefixes of `text`, growing by `chunk_size` characters.
///
/// Always returns at least one window, so empty or short text is a single emission.
pub fn cumulative_windows(text: &str, chunk_size: usize) -> Vec<&str> {
    let chunk_size = chunk_size.max(1);
    let mut boundaries = text
        .char_indices()
        .map(|(index, _)| index)
        .skip(chunk_size)
        .step_by(chunk_size)
        .collect::<Vec<_>>();
    boundaries.push(text.len());

    boundaries.into_iter().map(|end| &text[..end]).collect()
}

/// Emits the windows of `text` with `delay` between emissions; the last one is
/// complete and carries `suggestions`.
pub fn simulate_chunks(
    text: String,
    suggestions: Vec<String>,
    chunk_size: usize,
    delay: Duration,
) -> impl Stream<Item = StreamingChunk> + Send {
    stream! {
        let windows = cumulative_windows(&text, chunk_size)
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>();
        let last = windows.len() - 1;

        for (index, window) in windows.into_iter().enumerate() {
            if index == last {
                yield StreamingChunk::complete(window, suggestions.clone());
            } else {
                yield StreamingChunk::partial(window);
                Delay::new(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use futures_util::StreamExt;

    use super::*;

    #[test]
    fn window_count_is_ceiling_of_length_over_size() {
        let text = "x".repeat(120);
        let windows = cumulative_windows(&text, CHUNK_SIZE);

        assert_eq!(windows.len(), 3);
        assert_eq!(windows[0].len(), 50);
        assert_eq!(windows[1].len(), 100);
        assert_eq!(windows[2], text);
    }

    #[test]
    fn exact_multiple_does_not_emit_a_trailing_duplicate() {
        let text = "y".repeat(100);
        assert_eq!(cumulative_windows(&text, CHUNK_SIZE).len(), 2);
    }

    #[test]
    fn short_and_empty_text_are_single_windows() {
        assert_eq!(cumulative_windows("Xin chào", CHUNK_SIZE), vec!["Xin chào"]);
        assert_eq!(cumulative_windows("", CHUNK_SIZE), vec![""]);
    }

    #[test]
    fn windows_split_on_characters_not_bytes() {
        let text = "ệ".repeat(75);
        let windows = cumulative_windows(&text, CHUNK_SIZE);

        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].chars().count(), 50);
        assert_eq!(windows[1], text);
    }

    #[tokio::test]
    async fn only_the_final_chunk_is_complete() {
        let text = "a".repeat(130);
        let chunks = simulate_chunks(
            text.clone(),
            vec!["Thử lại".to_string()],
            CHUNK_SIZE,
            Duration::ZERO,
        )
        .collect::<Vec<_>>()
        .await;

        assert_eq!(chunks.len(), 3);
        for (k, chunk) in chunks.iter().enumerate() {
            let expected = ((k + 1) * CHUNK_SIZE).min(text.len());
            assert_eq!(chunk.content, text[..expected]);
            assert_eq!(chunk.is_complete, k == 2);
        }
        assert_eq!(chunks[2].suggestions, Some(vec!["Thử lại".to_string()]));
        assert!(chunks[0].suggestions.is_none());
    }
}
