//! The learning loop that drives a whole stream through the predictor,
//! and the framing of the compressed artifact.
//!
//! The artifact never carries model state. It stores, per guess run, one
//! flag bit (the whole run was right) or a flag bit plus the index of the
//! first wrong bit. Decompression rebuilds the same predictor, replays
//! the same guess runs against the reconstructed history, and uses the
//! records to decide where the ensemble was wrong.

use crate::bitstream::{num_bits, BitBuf, BitReader};
use crate::predictor::{GuessRun, Predictor};
use crate::utils::number_encoding::{decode32, encode32};
use crate::utils::signatures::{match_signature, PREDICT_SIG};
use crate::{Context, Decoder, Encoder, Error};

pub struct PredictiveEncoder<'a> {
    /// The uncompressed input.
    input: &'a [u8],
    /// The output stream.
    output: &'a mut Vec<u8>,
    /// Encoder context.
    ctx: Context,
}

/// The committed bits of a run, given the replayed guesses and the index
/// of the first wrong bit: the correct prefix plus the flipped bit.
fn corrected_prefix(run: &GuessRun, wrong: usize) -> Vec<u8> {
    let mut bits = run.bits[..wrong].to_vec();
    bits.push(1 - run.bits[wrong]);
    bits
}

/// A length destined for one of the artifact's fixed 32-bit header
/// fields. Streams that do not fit cannot be framed and the operation
/// aborts instead of writing a truncated length.
fn header_field(len: usize) -> Result<u32, Error> {
    u32::try_from(len).map_err(|_| Error::OversizedInput(len))
}

impl<'a> PredictiveEncoder<'a> {
    fn encode_impl(&mut self) -> Result<usize, Error> {
        let byte_len = header_field(self.input.len())?;
        self.output.extend(PREDICT_SIG);
        encode32(byte_len, self.output);

        let truth = BitBuf::from_bytes(self.input);
        let mut predictor = Predictor::new(&self.ctx, truth.len());
        let mut records = BitBuf::new();
        let mut runs: usize = 0;
        let mut misses: usize = 0;

        while !predictor.done() {
            let run = predictor.guess_run(&truth)?;
            let start = predictor.position().input;

            let wrong = run
                .bits
                .iter()
                .enumerate()
                .find(|(i, bit)| truth.get(start + i) != **bit)
                .map(|(i, _)| i);

            let actual = match wrong {
                None => {
                    records.push(1);
                    run.bits.clone()
                }
                Some(k) => {
                    records.push(0);
                    // The decoder replays the identical run, so the
                    // index width is derivable on both sides.
                    let width = num_bits((run.bits.len() - 1) as u32);
                    records.push_bits(k as u32, width);
                    misses += 1;
                    corrected_prefix(&run, k)
                }
            };
            predictor.commit(&truth, &run, &actual);
            runs += 1;
        }

        log::debug!(
            "Encoded {} bits in {} runs ({} mispredicted).",
            truth.len(),
            runs,
            misses
        );

        encode32(header_field(records.len())?, self.output);
        self.output.extend(records.as_bytes());
        Ok(PREDICT_SIG.len() + 8 + records.as_bytes().len())
    }
}

pub struct PredictiveDecoder<'a> {
    /// The compressed artifact.
    input: &'a [u8],
    /// The output stream.
    output: &'a mut Vec<u8>,
    /// Decoder context. Nothing about it is shipped in the artifact, so
    /// it must mirror the context the encoder ran with or the replayed
    /// predictions diverge.
    ctx: Context,
}

impl<'a> PredictiveDecoder<'a> {
    /// A decoder for an artifact that was encoded with 'ctx' rather than
    /// with the default context.
    pub fn with_context(
        input: &'a [u8],
        output: &'a mut Vec<u8>,
        ctx: Context,
    ) -> Self {
        PredictiveDecoder { input, output, ctx }
    }

    fn decode_impl(&mut self) -> Result<(usize, usize), Error> {
        if !match_signature(self.input, &PREDICT_SIG) {
            return Err(Error::CorruptArtifact);
        }
        let mut cursor = PREDICT_SIG.len();

        let (read, byte_len) =
            decode32(&self.input[cursor..]).ok_or(Error::CorruptArtifact)?;
        cursor += read;
        let (read, record_bits) =
            decode32(&self.input[cursor..]).ok_or(Error::CorruptArtifact)?;
        cursor += read;

        let record_bits = record_bits as usize;
        let record_bytes = (record_bits + 7) / 8;
        if self.input.len() < cursor + record_bytes {
            return Err(Error::CorruptArtifact);
        }
        let mut reader =
            BitReader::new(&self.input[cursor..cursor + record_bytes], record_bits)
                .ok_or(Error::CorruptArtifact)?;

        let total_bits = byte_len as usize * 8;
        let mut predictor = Predictor::new(&self.ctx, total_bits);
        let mut history = BitBuf::new();

        while !predictor.done() {
            let run = predictor.guess_run(&history)?;
            let flag = reader.read_bit().ok_or(Error::CorruptArtifact)?;

            let actual = if flag == 1 {
                run.bits.clone()
            } else {
                let width = num_bits((run.bits.len() - 1) as u32);
                let k = reader
                    .read_bits(width)
                    .ok_or(Error::CorruptArtifact)? as usize;
                if k >= run.bits.len() {
                    return Err(Error::CorruptArtifact);
                }
                corrected_prefix(&run, k)
            };

            for bit in &actual {
                history.push(*bit);
            }
            predictor.commit(&history, &run, &actual);
        }

        debug_assert_eq!(history.len(), total_bits);
        self.output.extend(history.as_bytes());
        Ok((cursor + record_bytes, byte_len as usize))
    }
}

impl<'a> Encoder<'a> for PredictiveEncoder<'a> {
    fn new(input: &'a [u8], output: &'a mut Vec<u8>, ctx: Context) -> Self {
        PredictiveEncoder { input, output, ctx }
    }

    fn encode(&mut self) -> Result<usize, Error> {
        self.encode_impl()
    }
}

impl<'a> Decoder<'a> for PredictiveDecoder<'a> {
    fn new(input: &'a [u8], output: &'a mut Vec<u8>) -> Self {
        Self::with_context(input, output, Context::default())
    }

    fn decode(&mut self) -> Result<(usize, usize), Error> {
        self.decode_impl()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_is_a_header_only_artifact() {
        let mut artifact = Vec::new();
        let written =
            PredictiveEncoder::new(&[], &mut artifact, Context::default())
                .encode()
                .unwrap();
        assert_eq!(written, artifact.len());
        // Signature, byte length, record bit length; no records.
        assert_eq!(artifact.len(), 12);

        let mut decoded = Vec::new();
        let (consumed, produced) =
            PredictiveDecoder::new(&artifact, &mut decoded)
                .decode()
                .unwrap();
        assert_eq!(consumed, artifact.len());
        assert_eq!(produced, 0);
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_single_byte_round_trip() {
        // 0x80 is the bit 1 followed by seven zeros.
        let input = [0x80u8];
        let mut artifact = Vec::new();
        PredictiveEncoder::new(&input, &mut artifact, Context::default())
            .encode()
            .unwrap();

        let mut decoded = Vec::new();
        PredictiveDecoder::new(&artifact, &mut decoded)
            .decode()
            .unwrap();
        assert_eq!(decoded, input);
    }

    #[test]
    fn test_oversized_lengths_cannot_be_framed() {
        assert_eq!(header_field(0).unwrap(), 0);
        assert_eq!(header_field(u32::MAX as usize).unwrap(), u32::MAX);
        assert!(matches!(
            header_field(usize::MAX),
            Err(Error::OversizedInput(usize::MAX))
        ));
    }

    #[test]
    fn test_decoder_context_matches_encoder_context() {
        use crate::models::ModelKind;

        let ctx = Context::new(vec![ModelKind::Statistics], 4, 4, 16);
        let input = b"one model only, one model only, one model only";

        let mut artifact = Vec::new();
        PredictiveEncoder::new(input, &mut artifact, ctx.clone())
            .encode()
            .unwrap();

        let mut decoded = Vec::new();
        PredictiveDecoder::with_context(&artifact, &mut decoded, ctx)
            .decode()
            .unwrap();
        assert_eq!(decoded, input);
    }

    #[test]
    fn test_wrong_signature_is_rejected() {
        let mut decoded = Vec::new();
        let status = PredictiveDecoder::new(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11], &mut decoded)
            .decode();
        assert!(matches!(status, Err(Error::CorruptArtifact)));
    }
}
