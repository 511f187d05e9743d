//! Container loaders and savers.
//!
//! A [`Registry`] holds loaders and savers in registration order. Loading
//! asks each loader in turn; a loader that answers "not my format" passes
//! the input on to the next one, any other failure stops the search.

use std::fmt;
use std::io::Write;

use veles_dds::{DecodeFlags, EncodeFlags, Texture};

use crate::{Error, Result};

/// Name of a texture container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainerKind(pub &'static str);

impl ContainerKind {
    /// DirectDraw Surface.
    pub const DDS: Self = Self("dds");

    /// Lowercase name, also used as file extension.
    #[inline]
    pub fn name(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Decodes one container format.
pub trait Loader: Send + Sync {
    fn kind(&self) -> ContainerKind;

    /// Decode `data`.
    ///
    /// Must fail with an error for which [`Loader::is_foreign`] holds when
    /// the input is some other format.
    fn load<'a>(&self, data: &'a [u8], options: DecodeFlags) -> Result<Texture<'a>>;

    /// Whether `error` means the input belongs to another format.
    fn is_foreign(&self, error: &Error) -> bool {
        matches!(error, Error::Dds(e) if e.is_not_container())
    }
}

/// Encodes one container format.
pub trait Saver: Send + Sync {
    fn kind(&self) -> ContainerKind;

    fn save(&self, texture: &Texture<'_>, writer: &mut dyn Write) -> Result<()>;
}

/// DDS loader and saver.
#[derive(Debug, Clone, Copy, Default)]
pub struct DdsContainer {
    /// Flags used when saving.
    pub encode_flags: EncodeFlags,
    /// Keep the header kind a decoded texture came with.
    pub keep_header_kind: bool,
}

impl Loader for DdsContainer {
    fn kind(&self) -> ContainerKind {
        ContainerKind::DDS
    }

    fn load<'a>(&self, data: &'a [u8], options: DecodeFlags) -> Result<Texture<'a>> {
        Ok(veles_dds::decode(data, options)?)
    }
}

impl Saver for DdsContainer {
    fn kind(&self) -> ContainerKind {
        ContainerKind::DDS
    }

    fn save(&self, texture: &Texture<'_>, writer: &mut dyn Write) -> Result<()> {
        if self.keep_header_kind && texture.header_kind().is_some() {
            writer.write_all(&veles_dds::reencode(texture)?)?;
        } else {
            veles_dds::encode_to(texture, self.encode_flags, writer)?;
        }
        Ok(())
    }
}

/// Loaders and savers consulted in registration order.
#[derive(Default)]
pub struct Registry {
    loaders: Vec<Box<dyn Loader>>,
    savers: Vec<Box<dyn Saver>>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every built-in container.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_loader(DdsContainer::default());
        registry.register_saver(DdsContainer::default());
        registry
    }

    pub fn register_loader(&mut self, loader: impl Loader + 'static) {
        self.loaders.push(Box::new(loader));
    }

    pub fn register_saver(&mut self, saver: impl Saver + 'static) {
        self.savers.push(Box::new(saver));
    }

    /// Registered loader kinds in lookup order.
    pub fn loaders(&self) -> impl Iterator<Item = ContainerKind> + '_ {
        self.loaders.iter().map(|loader| loader.kind())
    }

    /// Registered saver kinds in lookup order.
    pub fn savers(&self) -> impl Iterator<Item = ContainerKind> + '_ {
        self.savers.iter().map(|saver| saver.kind())
    }

    /// Decode `data` with the first loader that recognizes it.
    pub fn load<'a>(&self, data: &'a [u8], options: DecodeFlags) -> Result<(ContainerKind, Texture<'a>)> {
        for loader in &self.loaders {
            match loader.load(data, options) {
                Ok(texture) => return Ok((loader.kind(), texture)),
                Err(e) if loader.is_foreign(&e) => {
                    log::trace!("{} loader skipped input", loader.kind());
                }
                Err(e) => return Err(e),
            }
        }
        Err(Error::NoLoader)
    }

    /// Encode `texture` with the first saver registered for `kind`.
    pub fn save(&self, kind: ContainerKind, texture: &Texture<'_>, writer: &mut dyn Write) -> Result<()> {
        let saver = self
            .savers
            .iter()
            .find(|saver| saver.kind() == kind)
            .ok_or(Error::NoSaver(kind))?;
        saver.save(texture, writer)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("loaders", &self.loaders().collect::<Vec<_>>())
            .field("savers", &self.savers().collect::<Vec<_>>())
            .finish()
    }
}
