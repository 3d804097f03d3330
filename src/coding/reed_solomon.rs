//! Encoding and decoding of the (255, 32) Reed-Solomon code that spreads a HAS message
//! column-wise over its pages.
//!
//! The code operates over GF(2<sup>8</sup>) with field polynomial x<sup>8</sup> +
//! x<sup>7</sup> + x<sup>2</sup> + x + 1 and generator polynomial g(x) = ∏ (x −
//! α<sup>i</sup>) for i = 0, ..., 222. A codeword carries its 32 information symbols
//! first, so each symbol's codeword position equals its page index.

use std::ops::{Deref, DerefMut};

use collect_slice::CollectSlice;

use crate::coding::bmcf::{BerlMasseyDecoder, Errata};
use crate::coding::galois::{self, HasCodeword, Polynomial, PolynomialCoefs};
use crate::consts::{BLOCK_SYMBOLS, INFO_SYMBOLS, PARITY_SYMBOLS};

/// Coefficients of the generator polynomial, indexed by term degree.
const GENERATOR: [u8; PARITY_SYMBOLS + 1] = build_generator();

const fn build_generator() -> [u8; PARITY_SYMBOLS + 1] {
    let mut gen = [0; PARITY_SYMBOLS + 1];
    gen[0] = 1;

    let mut root = 0;

    while root < PARITY_SYMBOLS {
        // g(x) ← g(x)·(x + α^root)
        let alpha = galois::codeword_const(root);

        let mut i = root + 1;
        while i > 0 {
            gen[i] = gen[i - 1] ^ galois::mul_const(alpha, gen[i]);
            i -= 1;
        }
        gen[0] = galois::mul_const(alpha, gen[0]);

        root += 1;
    }

    gen
}

/// Calculate the 223 parity symbols for the given 32 information symbols, returning the
/// systematic 255-symbol codeword with the information symbols first.
pub fn encode(data: &[u8; INFO_SYMBOLS]) -> [u8; BLOCK_SYMBOLS] {
    let mut remainder = [HasCodeword::default(); PARITY_SYMBOLS];

    // Divide m(x)·x^223 by g(x), one information symbol at a time.
    for &sym in data.iter() {
        let feedback = HasCodeword::new(sym) + remainder[PARITY_SYMBOLS - 1];

        for i in (1..PARITY_SYMBOLS).rev() {
            remainder[i] = remainder[i - 1] + feedback * HasCodeword::new(GENERATOR[i]);
        }

        remainder[0] = feedback * HasCodeword::new(GENERATOR[0]);
    }

    let mut word = [0; BLOCK_SYMBOLS];
    word[..INFO_SYMBOLS].copy_from_slice(&data[..]);
    remainder.iter().rev().map(|c| c.bits())
        .collect_slice_checked(&mut word[INFO_SYMBOLS..]);

    word
}

/// Try to recover the codeword in the given received word, treating the given positions
/// (each less than 255, at most 223 in total) as erasures.
///
/// If decoding was successful, return `Some(fixed)`, where `fixed` is the number of
/// corrected symbols and the information symbols sit in `word[..32]`. Otherwise, return
/// `None` to indicate an unrecoverable word, the contents of which are then
/// unspecified.
pub fn decode(word: &mut [u8; BLOCK_SYMBOLS], erasures: &[usize]) -> Option<usize> {
    if erasures.len() > PARITY_SYMBOLS {
        return None;
    }

    let syn = syndromes::<HasCoefs>(word);

    if syn.degree().is_none() {
        // Already a codeword, so every erased symbol was in fact zero.
        return Some(0);
    }

    let locators = erasures.iter().map(|&pos| {
        HasCodeword::for_power(BLOCK_SYMBOLS - 1 - pos)
    });

    let errata = BerlMasseyDecoder::new(syn, locators).decode();
    let deg = errata.degree().expect("empty errata polynomial");

    let fixed = Errata::new(errata, syn).fold(0, |count, (pos, val)| {
        word[pos] ^= val.bits();
        count + 1
    });

    if fixed != deg {
        return None;
    }

    // Guard against a miscorrection escaping as data: the repaired word must re-check
    // as a codeword.
    if syndromes::<HasCoefs>(word).degree().is_some() {
        return None;
    }

    Some(fixed)
}

/// Calculate the syndrome polynomial S<sub>0</sub> + S<sub>1</sub>x + ··· for the given
/// word, where S<sub>j</sub> = r(α<sup>j</sup>).
fn syndromes<P: PolynomialCoefs>(word: &[u8; BLOCK_SYMBOLS]) -> Polynomial<P> {
    Polynomial::new((0..P::parity()).map(|pow| {
        let x = HasCodeword::for_power(pow);

        // The first received symbol maps to the highest degree.
        word.iter().fold(HasCodeword::default(), |s, &sym| {
            s * x + HasCodeword::new(sym)
        })
    }))
}

/// Polynomial coefficients for the HAS code.
#[derive(Copy, Clone)]
struct HasCoefs([HasCodeword; BLOCK_SYMBOLS + 1]);

impl PolynomialCoefs for HasCoefs {
    fn parity() -> usize { PARITY_SYMBOLS }
}

impl Default for HasCoefs {
    fn default() -> HasCoefs { HasCoefs([HasCodeword::default(); BLOCK_SYMBOLS + 1]) }
}

impl Deref for HasCoefs {
    type Target = [HasCodeword];
    fn deref(&self) -> &Self::Target { &self.0[..] }
}

impl DerefMut for HasCoefs {
    fn deref_mut(&mut self) -> &mut Self::Target { &mut self.0[..] }
}

#[cfg(test)]
mod test {
    use super::*;

    fn eval_generator(x: HasCodeword) -> HasCodeword {
        GENERATOR.iter().rev().fold(HasCodeword::default(), |s, &coef| {
            s * x + HasCodeword::new(coef)
        })
    }

    fn test_word() -> [u8; BLOCK_SYMBOLS] {
        let mut data = [0; INFO_SYMBOLS];

        for (i, sym) in data.iter_mut().enumerate() {
            *sym = (37 * i + 11) as u8;
        }

        encode(&data)
    }

    #[test]
    fn validate_coefs() {
        HasCoefs::default().validate();
    }

    #[test]
    fn verify_generator() {
        // Monic, degree 223, nonzero constant term.
        assert_eq!(GENERATOR[PARITY_SYMBOLS], 1);
        assert!(GENERATOR[0] != 0);

        // Every α^i for i = 0..223 must be a root, and nothing past them.
        for pow in 0..PARITY_SYMBOLS {
            assert!(eval_generator(HasCodeword::for_power(pow)).zero());
        }
        assert!(!eval_generator(HasCodeword::for_power(PARITY_SYMBOLS)).zero());
        assert!(!eval_generator(HasCodeword::for_power(254)).zero());
    }

    #[test]
    fn test_encode() {
        let word = test_word();

        // Systematic: information symbols pass through untouched.
        assert_eq!(word[0], 11);
        assert_eq!(word[1], 48);

        // The full codeword must evaluate to zero at every generator root.
        for pow in 0..PARITY_SYMBOLS {
            let x = HasCodeword::for_power(pow);
            let eval = word.iter().fold(HasCodeword::default(), |s, &sym| {
                s * x + HasCodeword::new(sym)
            });

            assert!(eval.zero());
        }
    }

    #[test]
    fn test_decode_clean() {
        let expected = test_word();
        let mut word = expected;

        assert_eq!(decode(&mut word, &[]), Some(0));
        assert_eq!(word[..], expected[..]);
    }

    #[test]
    fn test_decode_max_erasures() {
        let expected = test_word();
        let mut word = expected;

        // Wipe all 32 information symbols and 191 parity symbols.
        let erasures: Vec<usize> = (0..INFO_SYMBOLS).chain(64..255).collect();
        assert_eq!(erasures.len(), PARITY_SYMBOLS);

        for &pos in &erasures {
            word[pos] = 0;
        }

        let fixed = decode(&mut word, &erasures).unwrap();
        assert!(fixed <= PARITY_SYMBOLS);
        assert_eq!(word[..], expected[..]);
    }

    #[test]
    fn test_decode_erasure_overflow() {
        let mut word = test_word();
        let erasures: Vec<usize> = (0..PARITY_SYMBOLS + 1).collect();

        assert_eq!(decode(&mut word, &erasures), None);
    }

    #[test]
    fn test_decode_single_error() {
        let expected = test_word();
        let mut word = expected;

        word[40] ^= 0x55;

        assert_eq!(decode(&mut word, &[]), Some(1));
        assert_eq!(word[..], expected[..]);
    }

    #[test]
    fn test_decode_errors_and_erasures() {
        let expected = test_word();
        let mut word = expected;

        // 219 erasures and one unlisted error still fit: 2·1 + 219 ≤ 223.
        let erasures: Vec<usize> = (36..255).collect();
        assert_eq!(erasures.len(), 219);

        for &pos in &erasures {
            word[pos] = 0;
        }
        word[2] ^= 0x0F;

        let fixed = decode(&mut word, &erasures).unwrap();
        assert!(fixed >= 1);
        assert_eq!(word[..], expected[..]);
    }

    #[test]
    fn test_decode_unrecoverable() {
        let mut word = test_word();

        // 150 unlisted errors bury the codeword far past the 111-error bound. The
        // stride is invertible mod 255, so every position is hit exactly once.
        for i in 0..150 {
            word[(i * 2) % 255] ^= (i * 41 + 13) as u8 | 1;
        }

        assert_eq!(decode(&mut word, &[]), None);
    }

    #[test]
    fn test_decode_zero_message() {
        // The all-zero message encodes to the all-zero codeword, and erased positions
        // are then indistinguishable from received zeros.
        let mut word = encode(&[0; INFO_SYMBOLS]);
        assert!(word.iter().all(|&sym| sym == 0));

        let erasures: Vec<usize> = (0..100).collect();
        assert_eq!(decode(&mut word, &erasures), Some(0));
        assert!(word.iter().all(|&sym| sym == 0));
    }
}
