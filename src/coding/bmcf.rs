//! Implements the Berlekamp-Massey, Chien Search, and Forney algorithms for
//! errors-and-erasures decoding.
//!
//! The iteration is seeded with the known erasure locations, so the remaining syndromes
//! only have to pay for unexpected errors: ν errors and e erasures are resolvable as
//! long as 2ν + e doesn't exceed the parity symbol count.

use crate::coding::galois::{GaloisField, HasCodeword, HasField, Polynomial, PolynomialCoefs};

/// Implements the iterative part of the Berlekamp-Massey algorithm, seeded with erasure
/// locators.
pub struct BerlMasseyDecoder<P: PolynomialCoefs> {
    /// Syndrome polynomial: S<sub>0</sub> + S<sub>1</sub>x + ···
    syn: Polynomial<P>,
    /// Errata locator polynomial Λ(x), initialized to the erasure locator product.
    lambda: Polynomial<P>,
    /// Correction polynomial B(x).
    b: Polynomial<P>,
    /// Number of seeded erasures.
    erasures: usize,
    /// Current assumed errata count.
    order: usize,
}

impl<P: PolynomialCoefs> BerlMasseyDecoder<P> {
    /// Construct a new `BerlMasseyDecoder` from the given syndrome polynomial and
    /// erasure locators X<sub>k</sub> = α<sup>d<sub>k</sub></sup>, where d<sub>k</sub>
    /// is the degree of the erased codeword position.
    pub fn new<E>(syn: Polynomial<P>, locators: E) -> BerlMasseyDecoder<P>
        where E: Iterator<Item = HasCodeword>
    {
        // Λ(x) = ∏ (1 - X_k·x), built up one erasure at a time.
        let mut lambda = Polynomial::<P>::unit_power(0);
        let mut erasures = 0;

        for loc in locators {
            erasures += 1;

            for i in (1..=erasures).rev() {
                lambda[i] = lambda.coef(i) + lambda.coef(i - 1) * loc;
            }
        }

        BerlMasseyDecoder {
            syn,
            lambda,
            b: lambda,
            erasures,
            order: erasures,
        }
    }

    /// Perform the iterative steps over the syndromes not consumed by erasures and
    /// produce the errata-locator polynomial Λ(x).
    pub fn decode(mut self) -> Polynomial<P> {
        for r in self.erasures + 1..=P::parity() {
            self.step(r);
        }

        self.lambda
    }

    /// Perform one iterative step of the algorithm, updating the state polynomials and
    /// assumed order.
    fn step(&mut self, r: usize) {
        let discr = (0..r).fold(HasCodeword::default(), |s, i| {
            s + self.lambda.coef(i) * self.syn.coef(r - 1 - i)
        });

        if discr.zero() {
            self.b = self.b.shift_up();
            return;
        }

        let next = self.lambda + self.b.shift_up() * discr;

        if 2 * self.order <= r + self.erasures - 1 {
            self.order = r + self.erasures - self.order;
            self.b = self.lambda * discr.invert();
        } else {
            self.b = self.b.shift_up();
        }

        self.lambda = next;
    }
}

/// Uses Chien search to find the roots of an errata-locator polynomial and produce an
/// iterator of codeword error positions. The Forney algorithm is used to find the
/// associated error values.
pub struct Errata<P: PolynomialCoefs> {
    /// Errata location polynomial.
    errs: Polynomial<P>,
    /// Derivative of above.
    deriv: Polynomial<P>,
    /// Errata value polynomial.
    vals: Polynomial<P>,
    /// Current exponent power of the iteration.
    pow: std::ops::Range<usize>,
}

impl<P: PolynomialCoefs> Errata<P> {
    /// Construct a new `Errata` from the given errata-locator and syndrome polynomials.
    pub fn new(errs: Polynomial<P>, syn: Polynomial<P>) -> Errata<P> {
        let deriv = errs.deriv();
        // Ω(x) = Λ(x)·S(x) mod x^parity.
        let vals = (errs * syn).truncate(P::parity() - 1);

        Errata {
            errs,
            deriv,
            vals,
            pow: 0..HasField::size(),
        }
    }

    /// Perform the term-updating step of the algorithm: x<sub>j,i</sub> =
    /// x<sub>j,i-1</sub> · α<sup>j</sup>.
    fn update_terms(&mut self) {
        for (pow, term) in self.errs.iter_mut().enumerate() {
            *term = *term * HasCodeword::for_power(pow);
        }
    }

    /// Calculate the sum of the terms -- evaluate the errata-locator polynomial at
    /// Λ(α<sup>i</sup>).
    fn sum_terms(&self) -> HasCodeword {
        self.errs.iter().fold(HasCodeword::default(), |s, &x| s + x)
    }

    /// Determine the errata value for the given locator/root.
    fn value(&self, loc: HasCodeword, root: HasCodeword) -> HasCodeword {
        self.vals.eval(root) / self.deriv.eval(root) * loc
    }
}

impl<P: PolynomialCoefs> Iterator for Errata<P> {
    /// Yields a codeword position, indexed from the first transmitted symbol, and the
    /// value to add to the symbol at that position.
    type Item = (usize, HasCodeword);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let pow = self.pow.next()?;

            let eval = self.sum_terms();
            self.update_terms();

            if !eval.zero() {
                continue;
            }

            let root = HasCodeword::for_power(pow);
            let loc = root.invert();

            // A repeated root has no resolvable value, so let the caller see a count
            // mismatch instead of dividing by zero.
            if self.deriv.eval(root).zero() {
                continue;
            }

            // The locator α^d marks the codeword position of degree d, counted from the
            // end of the block.
            let deg = loc.power().expect("zero locator");

            return Some((HasField::size() - 1 - deg, self.value(loc, root)));
        }
    }
}
