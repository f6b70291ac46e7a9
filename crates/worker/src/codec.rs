//! HTTP content codings.
//!
//! Decoding undoes a list of codings in reverse order of application, as
//! listed in a `Content-Encoding` header.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::{DeflateDecoder, MultiGzDecoder, ZlibDecoder};
use flate2::write::{GzEncoder, ZlibEncoder};
use thiserror::Error;

const BROTLI_BUFFER: usize = 4096;
const BROTLI_QUALITY: u32 = 9;
const BROTLI_LGWIN: u32 = 22;

/// Errors raised by the codecs.
#[derive(Debug, Error)]
pub enum CodecError {
	/// The coding name is not one this context can handle.
	#[error("unsupported content encoding: {0}")]
	UnsupportedEncoding(String),

	/// The input is not valid for the named coding.
	#[error("corrupt {encoding} data")]
	Corrupt {
		/// Coding that failed to decode.
		encoding: &'static str,
		/// The underlying decoder error.
		#[source]
		source: std::io::Error,
	},

	/// Encoding into memory failed.
	#[error("failed to encode as {encoding}")]
	Encode {
		/// Coding that failed to encode.
		encoding: &'static str,
		/// The underlying encoder error.
		#[source]
		source: std::io::Error,
	},
}

/// A supported content coding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
	/// No transformation.
	Identity,
	/// RFC 1952 gzip.
	Gzip,
	/// RFC 1950 zlib stream (HTTP `deflate`).
	Deflate,
	/// RFC 7932 Brotli.
	Brotli,
}

impl Encoding {
	/// Codings reported by [`encoding_sizes`].
	pub const PROBED: [Encoding; 4] = [Encoding::Identity, Encoding::Gzip, Encoding::Deflate, Encoding::Brotli];

	/// Parses a coding name, case-insensitively.
	pub fn parse(name: &str) -> Result<Self, CodecError> {
		match name.trim().to_ascii_lowercase().as_str() {
			"identity" => Ok(Self::Identity),
			"gzip" | "x-gzip" => Ok(Self::Gzip),
			"deflate" | "x-deflate" => Ok(Self::Deflate),
			"br" => Ok(Self::Brotli),
			_ => Err(CodecError::UnsupportedEncoding(name.to_string())),
		}
	}

	/// Canonical coding name.
	pub const fn name(self) -> &'static str {
		match self {
			Self::Identity => "identity",
			Self::Gzip => "gzip",
			Self::Deflate => "deflate",
			Self::Brotli => "br",
		}
	}

	/// Decodes `input` encoded with this coding.
	pub fn decode(self, input: &[u8]) -> Result<Vec<u8>, CodecError> {
		let corrupt = |source: std::io::Error| CodecError::Corrupt {
			encoding: self.name(),
			source,
		};
		let mut out = Vec::with_capacity(input.len().saturating_mul(2));
		match self {
			Self::Identity => out.extend_from_slice(input),
			Self::Gzip => {
				MultiGzDecoder::new(input).read_to_end(&mut out).map_err(corrupt)?;
			}
			Self::Deflate => {
				// Servers disagree on whether `deflate` carries the zlib wrapper.
				if ZlibDecoder::new(input).read_to_end(&mut out).is_err() {
					out.clear();
					DeflateDecoder::new(input).read_to_end(&mut out).map_err(corrupt)?;
				}
			}
			Self::Brotli => {
				brotli::Decompressor::new(input, BROTLI_BUFFER)
					.read_to_end(&mut out)
					.map_err(corrupt)?;
			}
		}
		Ok(out)
	}

	/// Encodes `input` with this coding.
	pub fn encode(self, input: &[u8]) -> Result<Vec<u8>, CodecError> {
		let failed = |source: std::io::Error| CodecError::Encode {
			encoding: self.name(),
			source,
		};
		match self {
			Self::Identity => Ok(input.to_vec()),
			Self::Gzip => {
				let mut enc = GzEncoder::new(Vec::new(), Compression::default());
				enc.write_all(input).map_err(failed)?;
				enc.finish().map_err(failed)
			}
			Self::Deflate => {
				let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
				enc.write_all(input).map_err(failed)?;
				enc.finish().map_err(failed)
			}
			Self::Brotli => {
				let mut enc = brotli::CompressorWriter::new(Vec::new(), BROTLI_BUFFER, BROTLI_QUALITY, BROTLI_LGWIN);
				enc.write_all(input).map_err(failed)?;
				Ok(enc.into_inner())
			}
		}
	}
}

/// Undoes `encodings`, applied in the given order, from `input`.
pub fn decode<S: AsRef<str>>(input: &[u8], encodings: &[S]) -> Result<Vec<u8>, CodecError> {
	let parsed = encodings
		.iter()
		.map(|name| -> &str { name.as_ref() })
		.filter(|name| !name.trim().is_empty())
		.map(Encoding::parse)
		.collect::<Result<Vec<_>, _>>()?;

	let mut current = input.to_vec();
	for encoding in parsed.into_iter().rev() {
		if encoding != Encoding::Identity {
			current = encoding.decode(&current)?;
		}
	}
	Ok(current)
}

/// Encoded size of `input` under each coding in [`Encoding::PROBED`].
pub fn encoding_sizes(input: &[u8]) -> Result<BTreeMap<String, usize>, CodecError> {
	Encoding::PROBED
		.iter()
		.map(|enc| -> Result<(String, usize), CodecError> {
			Ok((enc.name().to_string(), enc.encode(input)?.len()))
		})
		.collect()
}
