use ::basis::basis::AOBasis;
use ::basis::cgto::AtomBasis;
use ::basis::molecule::Molecule;
use color_eyre::eyre::{Result, WrapErr};
use std::collections::HashMap;
use std::marker::PhantomData;
use tracing::info;

pub type BasisMap<B> = HashMap<String, B>;

/// Loader trait that can be implemented for any atomic-orbital basis family.
pub trait BasisLoader<B: AOBasis> {
    fn load(&self, symbol: &str, basis_name: &str) -> Result<B>;
}

/// Basis sets compiled into the `basis` crate.
pub struct EmbeddedBasisLoader;

impl BasisLoader<AtomBasis> for EmbeddedBasisLoader {
    fn load(&self, symbol: &str, basis_name: &str) -> Result<AtomBasis> {
        AtomBasis::embedded(basis_name, symbol)
            .wrap_err_with(|| format!("Unable to load {} basis for {}", basis_name, symbol))
    }
}

/// Caches loaded basis sets per element.
pub struct BasisRegistry<B: AOBasis + Clone, L: BasisLoader<B>> {
    loader: L,
    cache: BasisMap<B>,
    _marker: PhantomData<B>,
}

impl<B: AOBasis + Clone, L: BasisLoader<B>> BasisRegistry<B, L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            cache: HashMap::new(),
            _marker: PhantomData,
        }
    }

    pub fn load_for_molecule(&mut self, basis_name: &str, molecule: &Molecule) -> Result<BasisMap<B>> {
        for symbol in molecule.elements() {
            if self.cache.contains_key(&symbol) {
                continue;
            }

            let basis = self.loader.load(&symbol, basis_name)?;
            info!("Loaded {} basis for {}: {} functions", basis_name, symbol, basis.basis_size());
            self.cache.insert(symbol, basis);
        }

        Ok(self.cache.clone())
    }
}
