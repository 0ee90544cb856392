// Reference driver tying the match finder to a decoding window.
//
// `parse` runs the encoder side of the boundary: it feeds input to a
// `MatchFinder` as the headroom allows, takes the preferred match at each
// step (or a literal when there is none) and skips past it.  `replay` and
// `expand` run the decoder side: literals and back-references are appended
// to a `Window` and drained to the output.
//
// Entropy coding of the tokens is left to the caller.

use log::debug;

use crate::error::{Error, WindowError};
use crate::hash::config::FinderConfig;
use crate::hash::matching::{Match, MatchFinder};
use crate::window::{Drain, Window};

/// Headroom of the window used by [`expand`].
pub const EXPAND_HEADROOM: usize = 1 << 12;

/// Match records requested per step.
const MATCH_SLOTS: usize = 16;

/// One parsed unit of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Literal(u8),
    Match { distance: usize, length: usize },
}

impl Token {
    /// Number of output bytes this token produces.
    pub fn len(&self) -> usize {
        match self {
            Token::Literal(_) => 1,
            Token::Match { length, .. } => *length,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Match> for Token {
    fn from(m: Match) -> Self {
        Token::Match {
            distance: m.distance,
            length: m.length,
        }
    }
}

// ---------------------------------------------------------------------------
// Encoder side
// ---------------------------------------------------------------------------

/// Greedy parse of `data` into literals and back-references.
pub fn parse(data: &[u8], config: &FinderConfig) -> Result<Vec<Token>, Error> {
    let mut finder = MatchFinder::new(config.clone())?;
    let mut matches = [Match::default(); MATCH_SLOTS];
    let mut tokens = Vec::with_capacity(data.len() / 4 + 1);
    let mut fed = 0usize;

    loop {
        while fed < data.len() && finder.available() > 0 {
            fed += finder.write(&data[fed..])?;
        }
        if fed == data.len() && !finder.is_eof() {
            finder.finish();
        }
        let Some(byte) = finder.current_byte() else {
            break;
        };

        let n = finder.find_matches(&mut matches);
        let token = if n == 0 {
            Token::Literal(byte)
        } else {
            matches[n - 1].into()
        };
        finder.skip(token.len());
        tokens.push(token);
    }

    debug!(
        "parsed {} bytes into {} tokens ({})",
        data.len(),
        tokens.len(),
        config.name
    );
    Ok(tokens)
}

// ---------------------------------------------------------------------------
// Decoder side
// ---------------------------------------------------------------------------

/// Append `tokens` to `window`, draining into `out` whenever it fills.
///
/// Bytes still buffered at the end are drained as well.  Back-references
/// longer than the free space are split; the periodic pattern of an
/// overlapping copy survives the split.
pub fn replay(tokens: &[Token], window: &mut Window, out: &mut Vec<u8>) -> Result<(), WindowError> {
    for token in tokens {
        match *token {
            Token::Literal(b) => {
                if window.available() == 0 {
                    drain(window, out);
                }
                window.append_byte(b)?;
            }
            Token::Match { distance, length } => {
                let mut remaining = length;
                while remaining > 0 {
                    if window.available() == 0 {
                        drain(window, out);
                    }
                    let n = remaining.min(window.available());
                    window.append_copy(distance, n)?;
                    remaining -= n;
                }
            }
        }
    }
    drain(window, out);
    Ok(())
}

/// Decode `tokens` into a fresh buffer using a window of `dict_capacity`.
pub fn expand(tokens: &[Token], dict_capacity: usize) -> Result<Vec<u8>, Error> {
    let mut window = Window::new(dict_capacity, EXPAND_HEADROOM)?;
    let mut out = Vec::with_capacity(tokens.iter().map(Token::len).sum());
    replay(tokens, &mut window, &mut out)?;
    window.set_eof();
    drain(&mut window, &mut out);
    Ok(out)
}

fn drain(window: &mut Window, out: &mut Vec<u8>) {
    let start = out.len();
    out.resize(start + window.buffered(), 0);
    let n = match window.consume(&mut out[start..]) {
        Drain::Bytes(n) => n,
        Drain::Pending | Drain::EndOfStream => 0,
    };
    out.truncate(start + n);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
