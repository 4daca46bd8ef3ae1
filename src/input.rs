//! Chunked input sources
//!
//! The processor consumes a stream of text chunks. This module builds such
//! streams from files, stdin, or in-memory strings. Byte reads may split a
//! multi-byte character; the decoder carries the incomplete tail into the
//! next chunk so the tokenizer only ever sees whole characters.

use encoding_rs::{CoderResult, Decoder, UTF_8};
use futures::stream::{self, BoxStream, StreamExt};
use std::io;
use std::path::Path;
use tokio::io::{AsyncRead, AsyncReadExt};

/// A boxed stream of decoded text chunks
pub type ChunkStream = BoxStream<'static, io::Result<String>>;

const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Incremental UTF-8 decoder for arbitrarily split byte chunks
///
/// Invalid sequences are replaced with U+FFFD; incomplete trailing
/// sequences are held back by the underlying decoder until more bytes
/// arrive. A leading byte order mark is dropped. Call `finish` exactly
/// once, at end of input.
pub struct Utf8ChunkDecoder {
    decoder: Decoder,
}

impl Default for Utf8ChunkDecoder {
    fn default() -> Self {
        Self {
            decoder: UTF_8.new_decoder(),
        }
    }
}

impl Utf8ChunkDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes as much of the buffered input as forms complete characters
    pub fn decode(&mut self, bytes: &[u8]) -> String {
        self.decode_chunk(bytes, false)
    }

    /// Flushes any leftover bytes at end of input
    pub fn finish(&mut self) -> Option<String> {
        let rest = self.decode_chunk(&[], true);
        (!rest.is_empty()).then_some(rest)
    }

    fn decode_chunk(&mut self, mut bytes: &[u8], last: bool) -> String {
        let mut out = String::new();

        loop {
            let needed = self
                .decoder
                .max_utf8_buffer_length(bytes.len())
                .unwrap_or(READ_CHUNK_SIZE);
            out.reserve(needed);

            let (result, read, _) = self.decoder.decode_to_string(bytes, &mut out, last);
            bytes = &bytes[read..];

            match result {
                CoderResult::InputEmpty => break,
                CoderResult::OutputFull => continue,
            }
        }

        out
    }
}

/// Streams decoded text chunks from any async reader
pub fn read_chunks<R>(reader: R) -> ChunkStream
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let state = (reader, Utf8ChunkDecoder::new(), false);

    stream::unfold(state, |(mut reader, mut decoder, done)| async move {
        if done {
            return None;
        }

        let mut buf = vec![0u8; READ_CHUNK_SIZE];
        loop {
            match reader.read(&mut buf).await {
                Ok(0) => {
                    return decoder
                        .finish()
                        .map(|rest| (Ok(rest), (reader, decoder, true)));
                }
                Ok(n) => {
                    let text = decoder.decode(&buf[..n]);
                    if text.is_empty() {
                        continue;
                    }
                    return Some((Ok(text), (reader, decoder, false)));
                }
                Err(e) => return Some((Err(e), (reader, decoder, true))),
            }
        }
    })
    .boxed()
}

/// Opens the input source: the file at `path`, or stdin for `None` or `-`
pub async fn open_input(path: Option<&Path>) -> io::Result<ChunkStream> {
    match path {
        Some(path) if path != Path::new("-") => {
            let file = tokio::fs::File::open(path).await?;
            tracing::debug!("Reading input from {}", path.display());
            Ok(read_chunks(file))
        }
        _ => {
            tracing::debug!("Reading input from stdin");
            Ok(read_chunks(tokio::io::stdin()))
        }
    }
}

/// Builds a chunk stream from in-memory strings
pub fn from_chunks<I, S>(chunks: I) -> ChunkStream
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let chunks: Vec<io::Result<String>> = chunks.into_iter().map(|c| Ok(c.into())).collect();
    stream::iter(chunks).boxed()
}
