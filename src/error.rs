use std::fmt;

#[derive(Debug)]
pub enum EditorError {
    Load(LoadError),
    Export(ExportError),
    Audio(AudioError),
    Config(ConfigError),
    #[cfg(feature = "store")]
    Store(StoreError),
}

/// Reasons a session could not be initialised from store data.
#[derive(Debug)]
pub enum LoadError {
    /// Fetching project or audio data failed; nothing was initialised.
    Fetch(String),
    EmptyAudio,
    /// A WAV payload could not be decoded.
    Decode(String),
    /// Synthetic wave parameters give no usable signal.
    InvalidWave(String),
}

#[derive(Debug)]
pub enum ExportError {
    /// No surface has been rendered yet, or it has zero area.
    SurfaceUnavailable,
    NoData,
    NoAudioFiles,
    Encode(String),
    Io(std::io::Error),
}

#[derive(Debug)]
pub enum AudioError {
    /// The host did not provide an audio output.
    Unavailable,
    Playback(String),
}

#[derive(Debug)]
pub enum ConfigError {
    Parse(String),
    InvalidColor(String),
}

#[cfg(feature = "store")]
#[derive(Debug)]
pub enum StoreError {
    Http(reqwest::Error),
    Status { url: String, status: u16 },
    Io(std::io::Error),
}

impl fmt::Display for EditorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditorError::Load(e) => write!(f, "Load error: {e}"),
            EditorError::Export(e) => write!(f, "Export error: {e}"),
            EditorError::Audio(e) => write!(f, "Audio error: {e}"),
            EditorError::Config(e) => write!(f, "Config error: {e}"),
            #[cfg(feature = "store")]
            EditorError::Store(e) => write!(f, "Store error: {e}"),
        }
    }
}

impl std::error::Error for EditorError {}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Fetch(msg) => write!(f, "Failed to load project data: {msg}"),
            LoadError::EmptyAudio => write!(f, "Project has no audio samples"),
            LoadError::Decode(msg) => write!(f, "Could not decode audio: {msg}"),
            LoadError::InvalidWave(msg) => write!(f, "Invalid wave parameters: {msg}"),
        }
    }
}

impl std::error::Error for LoadError {}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::SurfaceUnavailable => write!(f, "Surface not available for export"),
            ExportError::NoData => write!(f, "Data not available for export"),
            ExportError::NoAudioFiles => write!(f, "No audio files available for download"),
            ExportError::Encode(msg) => write!(f, "Encoding failed: {msg}"),
            ExportError::Io(e) => write!(f, "I/O failure: {e}"),
        }
    }
}

impl std::error::Error for ExportError {}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioError::Unavailable => write!(f, "Audio output not available"),
            AudioError::Playback(msg) => write!(f, "Playback failed: {msg}"),
        }
    }
}

impl std::error::Error for AudioError {}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse(msg) => write!(f, "Invalid config: {msg}"),
            ConfigError::InvalidColor(text) => write!(f, "Invalid color '{text}'"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(feature = "store")]
impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Http(e) => write!(f, "Request failed: {e}"),
            StoreError::Status { url, status } => write!(f, "{url} returned HTTP {status}"),
            StoreError::Io(e) => write!(f, "I/O failure: {e}"),
        }
    }
}

#[cfg(feature = "store")]
impl std::error::Error for StoreError {}

impl From<LoadError> for EditorError {
    fn from(e: LoadError) -> Self {
        EditorError::Load(e)
    }
}

impl From<ExportError> for EditorError {
    fn from(e: ExportError) -> Self {
        EditorError::Export(e)
    }
}

impl From<AudioError> for EditorError {
    fn from(e: AudioError) -> Self {
        EditorError::Audio(e)
    }
}

impl From<ConfigError> for EditorError {
    fn from(e: ConfigError) -> Self {
        EditorError::Config(e)
    }
}

impl From<std::io::Error> for ExportError {
    fn from(e: std::io::Error) -> Self {
        ExportError::Io(e)
    }
}

#[cfg(feature = "store")]
impl From<StoreError> for EditorError {
    fn from(e: StoreError) -> Self {
        EditorError::Store(e)
    }
}

#[cfg(feature = "store")]
impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        StoreError::Http(e)
    }
}

#[cfg(feature = "store")]
impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}
