//! Pull-driven archive encoder.
//!
//! [`ZipStream`] produces the archive one chunk per poll. It reads from the
//! byte source only when the current entry still needs data, so a slow
//! consumer never causes the source to be read ahead of it. Dropping the
//! stream drops the source.

use super::archive::TruncationPolicy;
use super::directory::central_directory;
use super::entry::FileEntry;
use bytes::Bytes;
use futures::stream::{FusedStream, Stream};
use log::{debug, warn};
use std::collections::VecDeque;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll, ready};
use zipstream_core::{Crc32Rolling, Result, RollingChecksum, ZipStreamError};

/// Stream of archive bytes built from a manifest and a concatenated byte source.
///
/// Yields `Ok(chunk)` items in archive order and ends after the end record.
/// The first `Err` is terminal: the source is released and the stream ends
/// after it.
pub struct ZipStream<S, C = Crc32Rolling> {
    entries: Vec<FileEntry>,
    cursor: usize,
    header_emitted: bool,
    leftover: Option<Bytes>,
    source: Option<S>,
    checksum: C,
    truncation: TruncationPolicy,
    ready: VecDeque<Bytes>,
    failure: Option<ZipStreamError>,
    expected_len: u64,
    emitted: u64,
    done: bool,
}

impl<S, C> ZipStream<S, C> {
    pub(crate) fn new(
        entries: Vec<FileEntry>,
        source: S,
        checksum: C,
        truncation: TruncationPolicy,
        expected_len: u64,
    ) -> Self {
        Self {
            entries,
            cursor: 0,
            header_emitted: false,
            leftover: None,
            source: Some(source),
            checksum,
            truncation,
            ready: VecDeque::new(),
            failure: None,
            expected_len,
            emitted: 0,
            done: false,
        }
    }

    /// Archive length for a complete source.
    pub fn expected_len(&self) -> u64 {
        self.expected_len
    }

    /// Bytes yielded so far.
    pub fn bytes_emitted(&self) -> u64 {
        self.emitted
    }

    /// Entries and their progress.
    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    /// Index of the entry being encoded; equals the entry count once the
    /// directory is reached.
    pub fn current_entry(&self) -> usize {
        self.cursor
    }

    fn release_source(&mut self) {
        if self.source.take().is_some() {
            debug!("released byte source");
        }
    }

    fn complete_entry(&mut self) {
        let entry = &self.entries[self.cursor];
        debug!(
            "finished entry {} ({} bytes, crc32 {:#010x})",
            entry.name(),
            entry.bytes_written(),
            entry.crc32()
        );
        self.ready.push_back(entry.data_descriptor());
        self.cursor += 1;
        self.header_emitted = false;
    }

    fn source_ended(&mut self) -> Result<()> {
        let entry = &self.entries[self.cursor];
        match self.truncation {
            TruncationPolicy::Strict => Err(ZipStreamError::source_truncated(
                entry.name(),
                entry.size(),
                entry.bytes_written(),
            )),
            TruncationPolicy::Lenient => {
                warn!(
                    "source ended early: {} has {} of {} bytes",
                    entry.name(),
                    entry.bytes_written(),
                    entry.size()
                );
                self.complete_entry();
                Ok(())
            }
        }
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(extra) = self.leftover.take() {
            warn!("discarding {} source bytes past the last entry", extra.len());
        }
        self.release_source();

        let directory = central_directory(&self.entries)?;
        debug!(
            "writing central directory for {} entries ({} bytes)",
            self.entries.len(),
            directory.len()
        );
        self.ready.push_back(directory);
        self.done = true;
        Ok(())
    }

    fn fail(&mut self, err: ZipStreamError) {
        warn!("archive stream failed: {err}");
        self.release_source();
        self.leftover = None;
        self.failure = Some(err);
    }
}

impl<S, C> ZipStream<S, C>
where
    S: Stream<Item = io::Result<Bytes>> + Unpin,
    C: RollingChecksum,
{
    /// Run one step of the encoder, queueing whatever it produces.
    fn advance(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        if self.cursor >= self.entries.len() {
            return Poll::Ready(self.finish());
        }

        let entry = &mut self.entries[self.cursor];

        if !self.header_emitted {
            debug!("starting entry {} ({} bytes)", entry.name(), entry.size());
            self.ready.push_back(entry.header());
            self.header_emitted = true;

            if let Some(spill) = self.leftover.take() {
                let appended = entry.append(spill, &self.checksum);
                if !appended.data.is_empty() {
                    self.ready.push_back(appended.data);
                }
                self.leftover = appended.leftover;
            }
            return Poll::Ready(Ok(()));
        }

        if entry.is_complete() {
            self.complete_entry();
            return Poll::Ready(Ok(()));
        }

        let Some(source) = self.source.as_mut() else {
            return Poll::Ready(self.source_ended());
        };

        match ready!(Pin::new(source).poll_next(cx)) {
            Some(Ok(chunk)) => {
                let appended = entry.append(chunk, &self.checksum);
                if !appended.data.is_empty() {
                    self.ready.push_back(appended.data);
                }
                self.leftover = appended.leftover;
                Poll::Ready(Ok(()))
            }
            Some(Err(err)) => Poll::Ready(Err(err.into())),
            None => {
                debug!("byte source exhausted");
                self.source = None;
                Poll::Ready(self.source_ended())
            }
        }
    }
}

impl<S, C> Stream for ZipStream<S, C>
where
    S: Stream<Item = io::Result<Bytes>> + Unpin,
    C: RollingChecksum + Unpin,
{
    type Item = Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            if let Some(chunk) = this.ready.pop_front() {
                this.emitted += chunk.len() as u64;
                return Poll::Ready(Some(Ok(chunk)));
            }
            if let Some(err) = this.failure.take() {
                this.done = true;
                return Poll::Ready(Some(Err(err)));
            }
            if this.done {
                return Poll::Ready(None);
            }

            match this.advance(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Ok(())) => {}
                Poll::Ready(Err(err)) => this.fail(err),
            }
        }
    }
}

impl<S, C> FusedStream for ZipStream<S, C>
where
    S: Stream<Item = io::Result<Bytes>> + Unpin,
    C: RollingChecksum + Unpin,
{
    fn is_terminated(&self) -> bool {
        self.done && self.ready.is_empty() && self.failure.is_none()
    }
}

impl<S, C> Drop for ZipStream<S, C> {
    fn drop(&mut self) {
        if !self.done && self.source.is_some() {
            debug!(
                "archive stream dropped at entry {} of {}",
                self.cursor,
                self.entries.len()
            );
        }
    }
}

impl<S, C> std::fmt::Debug for ZipStream<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZipStream")
            .field("entries", &self.entries.len())
            .field("cursor", &self.cursor)
            .field("emitted", &self.emitted)
            .field("expected_len", &self.expected_len)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}
