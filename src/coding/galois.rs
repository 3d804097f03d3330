//! Galois field arithmetic for codewords and polynomials.

use std::marker::PhantomData;
use std::ops::{Add, Deref, DerefMut, Div, Mul, Sub};

use collect_slice::CollectSlice;

/// Modulus of the field: x<sup>8</sup> + x<sup>7</sup> + x<sup>2</sup> + x + 1.
const FIELD_POLY: u16 = 0x187;

/// Codewords α<sup>0</sup>, ..., α<sup>254</sup>, where each codeword α<sup>i</sup>
/// represents the polynomial x<sup>i</sup> mod h(x).
const CODEWORDS: [u8; 255] = build_codewords();

/// Maps each codeword α<sup>i</sup>, offset by one, back to its power i.
const POWERS: [u8; 255] = build_powers();

const fn build_codewords() -> [u8; 255] {
    let mut table = [0; 255];
    let mut codeword: u16 = 1;
    let mut pow = 0;

    while pow < 255 {
        table[pow] = codeword as u8;

        codeword <<= 1;
        if codeword & 0x100 != 0 {
            codeword ^= FIELD_POLY;
        }

        pow += 1;
    }

    table
}

const fn build_powers() -> [u8; 255] {
    let codewords = build_codewords();
    let mut table = [0; 255];
    let mut pow = 0;

    while pow < 255 {
        table[codewords[pow] as usize - 1] = pow as u8;
        pow += 1;
    }

    table
}

/// Multiply two field elements. Usable in const contexts for building code tables.
pub(crate) const fn mul_const(lhs: u8, rhs: u8) -> u8 {
    if lhs == 0 || rhs == 0 {
        0
    } else {
        let pow = POWERS[lhs as usize - 1] as usize + POWERS[rhs as usize - 1] as usize;
        CODEWORDS[pow % 255]
    }
}

/// Map the given power i to codeword α<sup>i</sup>. Usable in const contexts.
pub(crate) const fn codeword_const(pow: usize) -> u8 {
    CODEWORDS[pow % 255]
}

/// GF(2<sup>8</sup>) field characterized by x<sup>8</sup> + x<sup>7</sup> +
/// x<sup>2</sup> + x + 1, as specified for the HAS outer code.
#[derive(Copy, Clone, Debug)]
pub struct HasField;

impl GaloisField for HasField {
    fn size() -> usize { 255 }
    fn codeword(pow: usize) -> u8 { CODEWORDS[pow] }
    fn power(codeword: usize) -> usize { POWERS[codeword] as usize }
}

/// Codeword in the HAS Galois field.
pub type HasCodeword = Codeword<HasField>;

/// A GF(2<sup>r</sup>) Galois field.
pub trait GaloisField {
    /// Number of nonzero codewords in the field: 2<sup>r</sup> - 1.
    fn size() -> usize;
    /// Map the given power i to codeword α<sup>i</sup>.
    fn codeword(pow: usize) -> u8;
    /// Map the given codeword α<sup>i</sup>, offset by one, to its power i.
    fn power(codeword: usize) -> usize;

    /// Map the given power i to codeword α<sup>m</sup> ≡ α<sup>i</sup> (modulo the size
    /// of the field.)
    fn codeword_modded(pow: usize) -> u8 {
        Self::codeword(pow % Self::size())
    }
}

/// Codeword in a Galois field.
#[derive(Copy, Clone)]
pub struct Codeword<F: GaloisField> {
    field: PhantomData<F>,
    bits: u8,
}

impl<F: GaloisField> Codeword<F> {
    /// Construct a new `Codeword` from the given bit pattern.
    pub fn new(bits: u8) -> Codeword<F> {
        Codeword {
            field: PhantomData,
            bits,
        }
    }

    /// Construct a new `Codeword` α<sup>m</sup> ≡ α<sup>i</sup> (modulo the field) for
    /// the given power i.
    pub fn for_power(power: usize) -> Codeword<F> {
        Codeword::new(F::codeword_modded(power))
    }

    /// Retrieve the bit pattern of the codeword.
    pub fn bits(&self) -> u8 { self.bits }

    /// Check if the codeword is zero.
    pub fn zero(&self) -> bool { self.bits == 0 }

    /// Retrieve the power i of the current codeword α<sup>i</sup>. Return `Some(i)` if
    /// the power is defined and `None` if the codeword is zero.
    pub fn power(&self) -> Option<usize> {
        if self.zero() {
            None
        } else {
            // Convert to zero-based index.
            Some(F::power(self.bits as usize - 1))
        }
    }

    /// Find 1/α<sup>i</sup> for the current codeword α<sup>i</sup>. Panic if the codeword
    /// is zero.
    pub fn invert(self) -> Codeword<F> {
        match self.power() {
            Some(p) => Codeword::for_power(F::size() - p),
            None => panic!("invert zero"),
        }
    }

    /// Compute (α<sup>i</sup>)<sup>p</sup> for the current codeword α<sup>i</sup> and
    /// given power p.
    pub fn pow(&self, pow: usize) -> Codeword<F> {
        match self.power() {
            Some(p) => Codeword::for_power(p * pow),
            None => Codeword::default(),
        }
    }
}

impl<F: GaloisField> Default for Codeword<F> {
    /// Construct the zero codeword.
    fn default() -> Self {
        Codeword::new(0)
    }
}

/// Add codewords using Galois addition.
impl<F: GaloisField> Add for Codeword<F> {
    type Output = Codeword<F>;

    fn add(self, rhs: Codeword<F>) -> Self::Output {
        Codeword::new(self.bits ^ rhs.bits)
    }
}

/// "Subtract" codewords, which is equivalent to addition.
impl<F: GaloisField> Sub for Codeword<F> {
    type Output = Codeword<F>;

    fn sub(self, rhs: Codeword<F>) -> Self::Output {
        self + rhs
    }
}

/// Multiply codewords using Galois multiplication.
impl<F: GaloisField> Mul for Codeword<F> {
    type Output = Codeword<F>;

    fn mul(self, rhs: Codeword<F>) -> Self::Output {
        match (self.power(), rhs.power()) {
            (Some(p), Some(q)) => Codeword::for_power(p + q),
            _ => Codeword::default(),
        }
    }
}

/// Divide codewords using Galois division. Panic if the divisor is zero.
impl<F: GaloisField> Div for Codeword<F> {
    type Output = Codeword<F>;

    fn div(self, rhs: Codeword<F>) -> Self::Output {
        match (self.power(), rhs.power()) {
            // Ensure non-negative power.
            (Some(p), Some(q)) => Codeword::for_power(F::size() + p - q),
            (None, Some(_)) => Codeword::default(),
            (_, None) => panic!("divide by zero"),
        }
    }
}

impl<F: GaloisField> PartialEq for Codeword<F> {
    fn eq(&self, other: &Self) -> bool {
        self.bits == other.bits
    }
}

impl<F: GaloisField> Eq for Codeword<F> {}

/// Check equality of the codeword's bit pattern with raw bits.
impl<F: GaloisField> PartialEq<u8> for Codeword<F> {
    fn eq(&self, other: &u8) -> bool {
        self.bits == *other
    }
}

impl<F: GaloisField> std::fmt::Debug for Codeword<F> {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.power() {
            Some(p) => write!(fmt, "Codeword::for_power({})", p),
            None => write!(fmt, "Codeword::default()"),
        }
    }
}

/// Coefficient storage for a bounded-degree Galois polynomial of a particular code.
pub trait PolynomialCoefs: Default + Copy + Clone +
    Deref<Target = [HasCodeword]> + DerefMut
{
    /// Number of parity symbols in the code: n - k.
    fn parity() -> usize;

    /// Verify the implementer is well-formed.
    fn validate(&self) {
        // Storage must hold the parity-many syndromes plus an errata locator one degree
        // larger.
        assert!(self.len() > Self::parity());
    }
}

/// Polynomial with HAS codewords as coefficients, where the coefficient at index i
/// belongs to the x<sup>i</sup> term.
#[derive(Copy, Clone)]
pub struct Polynomial<P: PolynomialCoefs> {
    /// Coefficients of the polynomial.
    coefs: P,
}

impl<P: PolynomialCoefs> Polynomial<P> {
    /// Construct a new `Polynomial` from the given coefficients c<sub>0</sub>, ...,
    /// c<sub>k</sub>.
    ///
    /// The resulting polynomial has the form p(x) = c<sub>0</sub> + c<sub>1</sub>x + ···
    /// + c<sub>k</sub>x<sup>k</sup>.
    pub fn new<T: Iterator<Item = HasCodeword>>(mut init: T) -> Self {
        // Start with all zero coefficients and add in the given ones.
        let mut coefs = P::default();
        init.collect_slice_exhaust(&mut coefs[..]);

        Polynomial { coefs }
    }

    /// Construct a new `Polynomial` with the single term p(x) = x<sup>n</sup>.
    pub fn unit_power(n: usize) -> Self {
        let mut coefs = P::default();
        coefs[n] = Codeword::for_power(0);

        Polynomial { coefs }
    }

    /// Retrieve the degree-0 coefficient, c<sub>0</sub>.
    pub fn constant(&self) -> HasCodeword {
        self.coefs[0]
    }

    /// Compute deg(p(x)), returned as `Some(deg)` if the polynomial is nonzero, or
    /// `None` if p(x) = 0.
    ///
    /// Note this is a O(n) operation.
    pub fn degree(&self) -> Option<usize> {
        for (deg, coef) in self.coefs.iter().enumerate().rev() {
            if !coef.zero() {
                return Some(deg);
            }
        }

        None
    }

    /// Retrieve the coefficient c<sub>i</sub> associated with the x<sup>i</sup> term.
    ///
    /// If i > deg(p(x)), 0 is returned.
    pub fn coef(&self, i: usize) -> HasCodeword {
        match self.coefs.get(i) {
            Some(&c) => c,
            None => HasCodeword::default(),
        }
    }

    /// Multiply the polynomial by x -- shift all coefficients to a higher degree. The
    /// highest-degree coefficient is discarded.
    ///
    /// This is a O(n) operation.
    pub fn shift_up(mut self) -> Polynomial<P> {
        for i in (0..self.coefs.len() - 1).rev() {
            self.coefs[i + 1] = self.coefs[i];
        }

        self.coefs[0] = HasCodeword::default();
        self
    }

    /// Evaluate p(x), substituting in the given x.
    pub fn eval(&self, x: HasCodeword) -> HasCodeword {
        // This uses Horner's method which, unlike the naive method, doesn't require a
        // call to `pow()` at each term.
        self.iter().rev().fold(HasCodeword::default(), |s, &coef| s * x + coef)
    }

    /// Truncate the polynomial so that deg(p(x)) ≤ d, where d is the given degree.
    ///
    /// This is a O(n) operation.
    pub fn truncate(mut self, deg: usize) -> Polynomial<P> {
        for i in (deg + 1)..self.coefs.len() {
            self.coefs[i] = HasCodeword::default();
        }

        self
    }

    /// Compute the formal derivative p'(x).
    pub fn deriv(mut self) -> Polynomial<P> {
        for i in 0..self.coefs.len() {
            self.coefs[i] = if i % 2 == 0 {
                self.coef(i + 1)
            } else {
                HasCodeword::default()
            };
        }

        self
    }
}

impl<P: PolynomialCoefs> Default for Polynomial<P> {
    /// Construct an empty polynomial, p(x) = 0.
    fn default() -> Self {
        Polynomial::new(std::iter::empty())
    }
}

/// Provides a slice of coefficients starting at the degree-0 term, [c<sub>0</sub>,
/// c<sub>1</sub>, ...].
impl<P: PolynomialCoefs> Deref for Polynomial<P> {
    type Target = [HasCodeword];
    fn deref(&self) -> &Self::Target { &self.coefs[..] }
}

impl<P: PolynomialCoefs> DerefMut for Polynomial<P> {
    fn deref_mut(&mut self) -> &mut Self::Target { &mut self.coefs[..] }
}

/// Add polynomials using Galois addition for coefficients.
impl<P: PolynomialCoefs> Add for Polynomial<P> {
    type Output = Polynomial<P>;

    fn add(mut self, rhs: Polynomial<P>) -> Self::Output {
        for (coef, &mix) in self.coefs.iter_mut().zip(rhs.coefs.iter()) {
            *coef = *coef + mix;
        }

        self
    }
}

/// Scale polynomial by a codeword.
impl<P: PolynomialCoefs> Mul<HasCodeword> for Polynomial<P> {
    type Output = Polynomial<P>;

    fn mul(mut self, rhs: HasCodeword) -> Self::Output {
        for coef in self.coefs.iter_mut() {
            *coef = *coef * rhs;
        }

        self
    }
}

/// Multiply polynomials using Galois multiplication for coefficients.
///
/// Note that resulting terms outside the bounds of the polynomial are silently discarded,
/// effectively computing p(x)q(x) mod x<sup>n+1</sup>, where n is the maximum degree
/// supported by the polynomial.
impl<P: PolynomialCoefs> Mul<Polynomial<P>> for Polynomial<P> {
    type Output = Polynomial<P>;

    fn mul(self, rhs: Polynomial<P>) -> Self::Output {
        let mut out = Polynomial::<P>::default();

        for (i, &coef) in self.iter().enumerate() {
            for (j, &mult) in rhs.iter().enumerate() {
                if let Some(c) = out.coefs.get_mut(i + j) {
                    *c = *c + coef * mult;
                }
            }
        }

        out
    }
}

impl<P: PolynomialCoefs> std::fmt::Debug for Polynomial<P> {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "Polynomial({:?})", &self.coefs[..])
    }
}
