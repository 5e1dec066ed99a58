pub mod bitstream;
pub mod engine;
pub mod key;
pub mod models;
pub mod position;
pub mod predictor;
pub mod utils;

use models::ModelKind;

/// Errors that can abort a compress or decompress operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The command line did not name a valid action and target.
    #[error("invalid usage: {0}")]
    InvalidUsage(String),
    /// The target file could not be opened or read.
    #[error("could not read from {0}")]
    UnreadableInput(String),
    /// A registered model variant has no voting behavior. This is a
    /// configuration defect, not a runtime condition.
    #[error("unknown prediction model: {0}")]
    UnknownModel(&'static str),
    /// The compressed artifact does not describe a well-formed sequence
    /// of guess corrections.
    #[error("corrupt artifact")]
    CorruptArtifact,
    /// The stream does not fit the artifact's fixed-width length fields.
    #[error("input too large to frame: {0} bytes")]
    OversizedInput(usize),
}

/// Stores information about the environment: which models vote, how far
/// back they may look, and how long a single guess run may grow.
#[derive(Clone)]
pub struct Context {
    /// The models that participate in every bit decision.
    models: Vec<ModelKind>,
    /// Context-length ceiling of the frequency model.
    statistics_levels: usize,
    /// Context-length ceiling of the pattern-dictionary model.
    dictionary_levels: usize,
    /// Upper bound on the length of one guess run.
    max_run: usize,
}

impl Context {
    pub fn new(
        models: Vec<ModelKind>,
        statistics_levels: usize,
        dictionary_levels: usize,
        max_run: usize,
    ) -> Self {
        assert!(statistics_levels >= 1 && dictionary_levels >= 1);
        assert!(max_run >= 1);
        Self {
            models,
            statistics_levels,
            dictionary_levels,
            max_run,
        }
    }

    pub fn models(&self) -> &[ModelKind] {
        &self.models
    }

    pub fn statistics_levels(&self) -> usize {
        self.statistics_levels
    }

    pub fn dictionary_levels(&self) -> usize {
        self.dictionary_levels
    }

    pub fn max_run(&self) -> usize {
        self.max_run
    }
}

impl Default for Context {
    /// The default registry: the two models with voting behavior,
    /// conditioning on up to 8 preceding bits, with runs capped at 64
    /// bits. An artifact never ships its context, so decompression must
    /// run with the same context as compression; the trait-level decoder
    /// assumes these defaults.
    fn default() -> Self {
        Self::new(
            vec![ModelKind::Statistics, ModelKind::HistoricDictionary],
            8,
            8,
            64,
        )
    }
}

/// A trait that defines the interface for encoding buffers.
pub trait Encoder<'a> {
    /// Creates a new Encoder that reads from 'input' and writes into 'output',
    /// with the encoder context 'ctx'.
    fn new(input: &'a [u8], output: &'a mut Vec<u8>, ctx: Context) -> Self;

    /// Encode the whole input buffer and return the number of bytes that were
    /// written into the output stream.
    fn encode(&mut self) -> Result<usize, Error>;
}

/// A trait that defines the interface for decoding buffers.
pub trait Decoder<'a> {
    /// Creates a new Decoder that reads from 'input' and writes into 'output'.
    fn new(input: &'a [u8], output: &'a mut Vec<u8>) -> Self;

    /// Decode the buffer 'input' and return the number of input bytes that
    /// were consumed followed by the number of bytes written.
    fn decode(&mut self) -> Result<(usize, usize), Error>;
}

/// Compress 'input' and return the artifact bytes.
pub fn compress(input: &[u8], ctx: Context) -> Result<Vec<u8>, Error> {
    use engine::PredictiveEncoder;
    let mut output = Vec::new();
    let written = PredictiveEncoder::new(input, &mut output, ctx).encode()?;
    debug_assert_eq!(written, output.len());
    Ok(output)
}

/// Decompress an artifact produced by [`compress`] and return the original
/// bytes. 'ctx' must be the context the artifact was compressed with: the
/// artifact carries no model configuration, so both sides must agree on it
/// out of band.
pub fn decompress(input: &[u8], ctx: Context) -> Result<Vec<u8>, Error> {
    use engine::PredictiveDecoder;
    let mut output = Vec::new();
    let (consumed, written) =
        PredictiveDecoder::with_context(input, &mut output, ctx).decode()?;
    debug_assert_eq!(consumed, input.len());
    debug_assert_eq!(written, output.len());
    Ok(output)
}
