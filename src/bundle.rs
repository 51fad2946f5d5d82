//! Kind-tagged archive lookup — the layer that knows *which* archive a
//! shape number lives in.
//!
//! The engine loads one archive per asset category (main shapes, gumps,
//! fonts, ...) and then names assets with `(kind, record, sub)` triples.
//! An [`AssetBundle`] holds every archive registered during the load phase
//! and resolves those triples against the right one, so a gump number is
//! never accidentally served from the main shape archive.  One bundle is
//! built per load phase and passed by reference to consumers; switching
//! game content means building a fresh bundle, never mutating a live one.

use std::collections::HashMap;
use std::io::{self, Read, Seek};

use crate::archive::RawArchive;

// ── ArchiveKind ──────────────────────────────────────────────────────────────

/// The asset categories the engine loads, one archive each.
///
/// The discriminant doubles as the opaque `u16` tag stored on
/// [`RawArchive`]; the reader never interprets it, this layer does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ArchiveKind {
    /// `fixed.dat` — static world data.
    Fixed = 1,
    /// `u8shapes.flx` — the main shape archive.
    MainShapes = 2,
    /// `u8gumps.flx` — UI overlay shapes.
    Gumps = 3,
    /// `u8fonts.flx` — font shapes.
    Fonts = 4,
    /// `usecode.flx` — script bytecode.
    Usecode = 5,
    /// `glob.flx` — map globs; every record is itself a nested archive.
    Globs = 6,
    /// `music.flx`.
    Music = 7,
    /// `sound.flx`.
    Sounds = 8,
}

impl ArchiveKind {
    pub const ALL: [ArchiveKind; 8] = [
        ArchiveKind::Fixed,
        ArchiveKind::MainShapes,
        ArchiveKind::Gumps,
        ArchiveKind::Fonts,
        ArchiveKind::Usecode,
        ArchiveKind::Globs,
        ArchiveKind::Music,
        ArchiveKind::Sounds,
    ];

    /// The opaque tag value carried by a [`RawArchive`].
    #[inline]
    pub fn tag(self) -> u16 {
        self as u16
    }

    /// Resolve a tag back to a kind.  `None` for tags this build does not
    /// know — unknown content categories are skipped, not guessed at.
    pub fn from_tag(tag: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.tag() == tag)
    }

    /// Human-readable name (for diagnostics only — never parsed back).
    pub fn name(self) -> &'static str {
        match self {
            ArchiveKind::Fixed      => "fixed",
            ArchiveKind::MainShapes => "mainshapes",
            ArchiveKind::Gumps      => "gumps",
            ArchiveKind::Fonts      => "fonts",
            ArchiveKind::Usecode    => "usecode",
            ArchiveKind::Globs      => "globs",
            ArchiveKind::Music      => "music",
            ArchiveKind::Sounds     => "sounds",
        }
    }
}

// ── FrameId ──────────────────────────────────────────────────────────────────

/// Composite asset key: which archive, which record, which unit inside it.
///
/// `sub` (a frame number, sample index, ...) is carried through untouched;
/// only the semantic decoder for the record's format gives it meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId {
    pub kind: ArchiveKind,
    pub record: u32,
    pub sub: u32,
}

impl FrameId {
    pub fn new(kind: ArchiveKind, record: u32, sub: u32) -> Self {
        Self { kind, record, sub }
    }
}

// ── AssetBundle ──────────────────────────────────────────────────────────────

/// Every archive loaded for the current game content, keyed by kind.
///
/// Register during the load phase, then treat as read-only: lookups take
/// `&mut self` only because reading a record seeks the backing source.
pub struct AssetBundle<R: Read + Seek> {
    archives: HashMap<ArchiveKind, RawArchive<R>>,
}

impl<R: Read + Seek> AssetBundle<R> {
    pub fn new() -> Self {
        Self { archives: HashMap::new() }
    }

    /// Register an archive under `kind`, replacing any previous one.
    /// The registration key is what lookups go by; the tag the archive
    /// carries from construction is advisory.
    pub fn register(&mut self, kind: ArchiveKind, archive: RawArchive<R>) {
        self.archives.insert(kind, archive);
    }

    /// The archive for `kind`, or `None` if that category was never loaded
    /// for this session (optional content, game-variant differences).
    pub fn archive(&self, kind: ArchiveKind) -> Option<&RawArchive<R>> {
        self.archives.get(&kind)
    }

    pub fn archive_mut(&mut self, kind: ArchiveKind) -> Option<&mut RawArchive<R>> {
        self.archives.get_mut(&kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = ArchiveKind> + '_ {
        self.archives.keys().copied()
    }

    /// Resolve a composite key to raw record bytes.
    ///
    /// Reads only from the archive registered under `id.kind`.  Unloaded
    /// kind, out-of-range record, and empty record all come back as
    /// `Ok(None)`; `id.sub` is ignored here and belongs to the decoder.
    pub fn resolve(&mut self, id: FrameId) -> io::Result<Option<Vec<u8>>> {
        match self.archives.get_mut(&id.kind) {
            Some(archive) => archive.read_record(id.record),
            None => Ok(None),
        }
    }
}

impl<R: Read + Seek> Default for AssetBundle<R> {
    fn default() -> Self {
        Self::new()
    }
}
