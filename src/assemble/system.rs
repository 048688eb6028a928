use super::config::FunctionalParams;
use super::error::Error;
use super::files::FileMap;
use super::plan::{self, DensityStep, InputStep, Plan, TargetStep};
use crate::io::{self, Backend, DftReader, Reader, cube};
use crate::model::density::DensityField;
use crate::model::features::{FeatureCollection, FeatureRef, FeatureStore};
use crate::model::structure::Structure;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// One assembled training example: the ordered model inputs, the target and
/// the data they were derived from.
#[derive(Debug)]
pub struct System {
    density: Option<DensityField>,
    structure: Structure,
    store: FeatureStore,
    features: FeatureCollection,
    prefactor: f64,
    train: String,
    outputs: Vec<f64>,
}

/// A feature vector borrowed from a [`System`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Feature<'a> {
    pub name: &'a str,
    pub values: &'a [f64],
}

/// Serializable view of an assembled example.
#[derive(Debug, Serialize)]
pub struct Example<'a> {
    pub train: &'a str,
    pub target: f64,
    pub prefactor: f64,
    pub locked: bool,
    pub features: Vec<Feature<'a>>,
}

impl System {
    /// Builds an example with the reader selected by the `code` entry of
    /// `files`.
    pub fn build(files: &FileMap, params: &FunctionalParams) -> Result<Self, Error> {
        let code = files
            .code()
            .ok_or_else(|| Error::configuration("the file map has no 'code' entry"))?;
        let backend: Backend = code
            .parse()
            .map_err(|e: io::UnknownBackend| Error::configuration(e.to_string()))?;
        let plan = Plan::resolve(params, backend)?;
        Self::assemble(Reader::open(backend), files, &plan)
    }

    /// Builds an example with a caller-supplied reader.
    pub fn build_with_reader<R: DftReader>(
        reader: R,
        files: &FileMap,
        params: &FunctionalParams,
    ) -> Result<Self, Error> {
        let plan = Plan::resolve(params, reader.backend())?;
        Self::assemble(reader, files, &plan)
    }

    // The reader is owned here and dropped on every return path.
    fn assemble<R: DftReader>(mut reader: R, files: &FileMap, plan: &Plan) -> Result<Self, Error> {
        let mut system = Self {
            density: None,
            structure: Structure::default(),
            store: FeatureStore::new(),
            features: FeatureCollection::new(),
            prefactor: 1.0,
            train: files.train().to_string(),
            outputs: Vec::new(),
        };
        let mut rng = match plan.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        for step in &plan.inputs {
            debug!(input = step.name(), "processing input");
            system.apply(&mut reader, files, step, &mut rng)?;
        }

        let target = system.resolve_target(&mut reader, files, plan)?;
        system.features.set_target(target);

        info!(
            backend = %reader.backend(),
            features = system.features.len(),
            target_value = target,
            train = %system.train,
            "assembled example"
        );
        Ok(system)
    }

    fn apply(
        &mut self,
        reader: &mut impl DftReader,
        files: &FileMap,
        step: &InputStep,
        rng: &mut StdRng,
    ) -> Result<(), Error> {
        match step {
            InputStep::Density(params) => {
                self.apply_density(reader, files, params)?;
                self.append(step, FeatureRef::Density)
            }
            InputStep::DensitySquared => Ok(()),
            InputStep::User { name, index } => {
                let values = fetch(format!("user property {index}"), || {
                    reader.get_user_property(*index, files.path(plan::USER)?)
                })?;
                let feature = self.store.insert(name.as_str(), values);
                self.append(step, feature)
            }
            InputStep::Structure => {
                let structure = fetch("structure", || {
                    reader.read_structure(files.path(plan::STRUCTURE)?)
                })?;
                if let Some(tag) = structure.train.as_deref().filter(|t| !t.is_empty()) {
                    self.train = tag.to_string();
                }
                debug!(atoms = structure.atom_count(), "structure loaded; locking features");
                self.structure = structure;
                self.features.lock();
                Ok(())
            }
            InputStep::Random => {
                let value: f64 = rng.gen_range(0.0..1.0);
                let feature = self.store.insert(plan::RANDOM, vec![value]);
                self.append(step, feature)
            }
            InputStep::Scalar { name } => {
                let value = fetch(format!("property '{name}'"), || {
                    reader.get_property(name, files.path(name)?)
                })?;
                let feature = self.store.insert(name.as_str(), vec![value]);
                self.append(step, feature)
            }
        }
    }

    fn apply_density(
        &mut self,
        reader: &mut impl DftReader,
        files: &FileMap,
        step: &DensityStep,
    ) -> Result<(), Error> {
        let reused = self.density.is_some();
        let density = match self.density.take() {
            Some(density) => density,
            None => fetch("density", || {
                reader.read_density(files.path(plan::DENSITY)?, step.stride)
            })?,
        };
        let density = self.density.insert(density);

        if let Some(target) = step.normalize {
            density.normalize(target)?;
        }
        density.variance(step.bounds);
        if let Some(size) = step.compress {
            // A reused field was compressed on its first pass.
            let compressed = reused && density.shape().iter().all(|&n| n <= size);
            if !compressed {
                density.conv_matrix(size)?;
            }
        }
        density.downsample(step.stride)?;

        self.prefactor *= density.dv();
        if step.intensive {
            self.prefactor /= density.volume();
        }
        if let Some(tag) = density.train.as_deref().filter(|t| !t.is_empty()) {
            self.train = tag.to_string();
        }
        debug!(points = density.len(), prefactor = self.prefactor, "density transformed");
        Ok(())
    }

    // Resolved plans never append after `structure`; plans built by hand can.
    fn append(&mut self, step: &InputStep, feature: FeatureRef) -> Result<(), Error> {
        self.features.push(feature).map_err(|_| Error::Locked {
            input: step.name().to_string(),
        })
    }

    fn resolve_target(
        &self,
        reader: &mut impl DftReader,
        files: &FileMap,
        plan: &Plan,
    ) -> Result<f64, Error> {
        match &plan.target {
            TargetStep::GwGap => fetch("target 'gw_gap'", || {
                reader.get_property(plan::GW_GAP, files.path(plan::GW_GAP)?)
            }),
            TargetStep::CustomUser => fetch("target 'user'", || {
                reader.get_property(plan::USER, files.path(plan::USER)?)
            }),
            TargetStep::User { index } => {
                let values = fetch(format!("target user property {index}"), || {
                    reader.get_user_property(*index, files.path(plan::USER)?)
                })?;
                values.first().copied().ok_or_else(|| {
                    Error::fetch(
                        format!("target user property {index}"),
                        io::Error::UserIndex {
                            index: *index,
                            available: 0,
                        },
                    )
                })
            }
            TargetStep::Energy => {
                let energy = fetch("target 'energy'", || {
                    reader.get_property(plan::ENERGY, files.path(plan::ENERGY)?)
                })?;
                let has_references = !plan.formation_energies.is_empty()
                    || !self.structure.formation_energies.is_empty();
                if !has_references {
                    return Ok(energy);
                }
                let corrected = self.structure.local_target(&plan.formation_energies, energy)?;
                debug!(energy, corrected, "applied local energy correction");
                Ok(corrected)
            }
            TargetStep::Scalar { name } => fetch(format!("target '{name}'"), || {
                reader.get_property(name, files.path(name)?)
            }),
        }
    }

    /// Feature vectors in input order.
    pub fn features(&self) -> impl Iterator<Item = Feature<'_>> + '_ {
        self.features.iter().filter_map(move |feature| self.resolve(feature))
    }

    fn resolve(&self, feature: FeatureRef) -> Option<Feature<'_>> {
        match feature {
            FeatureRef::Density => self.density.as_ref().map(|d| Feature {
                name: plan::DENSITY,
                values: d.values(),
            }),
            FeatureRef::Stored(idx) => self.store.get(idx).map(|f| Feature {
                name: &f.name,
                values: &f.values,
            }),
        }
    }

    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    pub fn is_locked(&self) -> bool {
        self.features.is_locked()
    }

    pub fn target(&self) -> f64 {
        self.features.target().unwrap_or(f64::NAN)
    }

    /// Integration weight of the density input: `dV`, divided by the cell
    /// volume for intensive targets.
    pub fn prefactor(&self) -> f64 {
        self.prefactor
    }

    pub fn train(&self) -> &str {
        &self.train
    }

    pub fn density(&self) -> Option<&DensityField> {
        self.density.as_ref()
    }

    pub fn structure(&self) -> &Structure {
        &self.structure
    }

    pub fn example(&self) -> Example<'_> {
        Example {
            train: &self.train,
            target: self.target(),
            prefactor: self.prefactor,
            locked: self.is_locked(),
            features: self.features().collect(),
        }
    }

    /// Records one model output for [`write_cube`](Self::write_cube).
    pub fn store_output(&mut self, value: f64) {
        self.outputs.push(value);
    }

    pub fn outputs(&self) -> &[f64] {
        &self.outputs
    }

    /// Writes the stored outputs to `<base>.out.cube` and the density grid to
    /// `<base>.in.cube`. Returns the two paths.
    pub fn write_cube(&self, base: &Path) -> Result<(PathBuf, PathBuf), Error> {
        let density = self.density.as_ref().ok_or(Error::MissingDensity)?;
        if self.outputs.len() != density.len() {
            warn!(
                outputs = self.outputs.len(),
                grid = density.len(),
                "output count does not match the density grid"
            );
        }

        let out_path = with_suffix(base, ".out.cube");
        let in_path = with_suffix(base, ".in.cube");
        write_cube_file(&out_path, cube::OUTPUT_TITLE, density, &self.outputs)?;
        write_cube_file(&in_path, cube::INPUT_TITLE, density, density.values())?;
        Ok((out_path, in_path))
    }
}

fn fetch<T>(
    what: impl Into<String>,
    f: impl FnOnce() -> Result<T, io::Error>,
) -> Result<T, Error> {
    f().map_err(|source| Error::fetch(what, source))
}

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

fn write_cube_file(
    path: &Path,
    title: &str,
    density: &DensityField,
    values: &[f64],
) -> Result<(), Error> {
    let output_err = |source| Error::Output {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(output_err)?;
    cube::write(BufWriter::new(file), title, density, values).map_err(output_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::atom::Atom;
    use crate::model::grid::GridHeader;
    use crate::model::types::Element;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::rc::Rc;

    /// In-memory reader recording the paths it was asked for.
    struct MockReader {
        backend: Backend,
        density: Option<DensityField>,
        structure: Structure,
        properties: HashMap<String, f64>,
        user: Vec<Vec<f64>>,
        requests: Rc<RefCell<Vec<(String, PathBuf)>>>,
        dropped: Rc<Cell<bool>>,
    }

    impl MockReader {
        fn new(backend: Backend) -> Self {
            Self {
                backend,
                density: Some(grid(4, 1.0)),
                structure: Structure::default(),
                properties: HashMap::from([("energy".to_string(), -10.5)]),
                user: vec![vec![1.0, 2.0], vec![3.0], vec![4.5, 5.5, 6.5]],
                requests: Rc::default(),
                dropped: Rc::default(),
            }
        }

        fn record(&self, what: &str, path: &Path) {
            self.requests
                .borrow_mut()
                .push((what.to_string(), path.to_path_buf()));
        }
    }

    impl Drop for MockReader {
        fn drop(&mut self) {
            self.dropped.set(true);
        }
    }

    impl DftReader for MockReader {
        fn backend(&self) -> Backend {
            self.backend
        }

        fn read_density(&mut self, path: &Path, _stride: usize) -> Result<DensityField, io::Error> {
            self.record("density", path);
            self.density
                .clone()
                .ok_or_else(|| io::Error::missing_property("density", path))
        }

        fn read_structure(&mut self, path: &Path) -> Result<Structure, io::Error> {
            self.record("structure", path);
            Ok(self.structure.clone())
        }

        fn get_property(&mut self, name: &str, path: &Path) -> Result<f64, io::Error> {
            self.record(name, path);
            self.properties
                .get(name)
                .copied()
                .ok_or_else(|| io::Error::missing_property(name, path))
        }

        fn get_user_property(&mut self, index: usize, path: &Path) -> Result<Vec<f64>, io::Error> {
            self.record(&format!("user{index}"), path);
            self.user.get(index - 1).cloned().ok_or(io::Error::UserIndex {
                index,
                available: self.user.len(),
            })
        }
    }

    /// An `n³` grid in a cubic 8-bohr cell.
    fn grid(n: usize, value: f64) -> DensityField {
        let cell = [[8.0, 0.0, 0.0], [0.0, 8.0, 0.0], [0.0, 0.0, 8.0]];
        DensityField::new(GridHeader::new([n; 3], cell), vec![value; n * n * n]).unwrap()
    }

    fn files() -> FileMap {
        [
            ("density", "rho.cube"),
            ("structure", "geom.in"),
            ("energy", "out.log"),
            ("user", "user.dat"),
            ("gw_gap", "gw.dat"),
            ("fermi", "fermi.dat"),
        ]
        .into_iter()
        .collect()
    }

    fn build(reader: MockReader, inputs: &[&str], output: &str) -> Result<System, Error> {
        System::build_with_reader(reader, &files(), &FunctionalParams::new(inputs, output))
    }

    fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() <= eps
    }

    #[test]
    fn density_length_and_prefactor_follow_downsampling() {
        let mut params = FunctionalParams::new(&["density"], "energy");
        params.density.sample_step = 2;
        let system = System::build_with_reader(MockReader::new(Backend::Vasp), &files(), &params)
            .expect("build system");

        let features: Vec<_> = system.features().collect();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].name, "density");
        assert_eq!(features[0].values.len(), 8);
        assert!(approx_eq(system.prefactor(), 512.0 / 8.0, 1e-12));
    }

    #[test]
    fn intensive_output_divides_prefactor_by_volume() {
        let mut params = FunctionalParams::new(&["density"], "energy");
        params.output_is_intensive = true;
        let system = System::build_with_reader(MockReader::new(Backend::Vasp), &files(), &params)
            .expect("build system");
        assert!(approx_eq(system.prefactor(), 8.0 / 512.0, 1e-15));
    }

    #[test]
    fn normalization_and_compression_run_before_downsampling() {
        let mut params = FunctionalParams::new(&["density"], "energy");
        params.density.normalize = Some(16.0);
        params.density.n_conv = 2;
        let system = System::build_with_reader(MockReader::new(Backend::Qe), &files(), &params)
            .expect("build system");

        let density = system.density().unwrap();
        assert_eq!(density.shape(), [2, 2, 2]);
        assert!(approx_eq(density.integral(), 16.0, 1e-9));
    }

    #[test]
    fn density_is_read_once() {
        let reader = MockReader::new(Backend::Vasp);
        let requests = Rc::clone(&reader.requests);
        let system = build(reader, &["density", "density"], "energy").unwrap();
        assert_eq!(system.feature_count(), 2);
        let reads = requests.borrow().iter().filter(|(w, _)| w == "density").count();
        assert_eq!(reads, 1);
    }

    #[test]
    fn repeated_density_keeps_compressed_grid() {
        let mut reader = MockReader::new(Backend::Vasp);
        reader.density = Some(grid(8, 1.0));
        let requests = Rc::clone(&reader.requests);
        let mut params = FunctionalParams::new(&["density", "density"], "energy");
        params.density.n_conv = 4;
        params.density.sample_step = 2;
        let system = System::build_with_reader(reader, &files(), &params).expect("build system");

        assert_eq!(system.feature_count(), 2);
        // 8³ -> compressed 4³ -> 2³, then the second pass downsamples to 1³.
        assert_eq!(system.density().unwrap().shape(), [1, 1, 1]);
        let reads = requests.borrow().iter().filter(|(w, _)| w == "density").count();
        assert_eq!(reads, 1);
    }

    #[test]
    fn fresh_grid_smaller_than_compression_fails() {
        let mut params = FunctionalParams::new(&["density"], "energy");
        params.density.n_conv = 8;
        let err = System::build_with_reader(MockReader::new(Backend::Vasp), &files(), &params)
            .unwrap_err();
        assert!(matches!(err, Error::Transform(_)));
    }

    #[test]
    fn density_squared_is_inert() {
        let reader = MockReader::new(Backend::Vasp);
        let requests = Rc::clone(&reader.requests);
        let system = build(reader, &["density^2"], "energy").unwrap();
        assert_eq!(system.feature_count(), 0);
        assert!(requests.borrow().iter().all(|(w, _)| w == "energy"));
    }

    #[test]
    fn structure_locks_collection() {
        let system = build(MockReader::new(Backend::Vasp), &["fermi", "structure"], "energy");
        // No fermi property in the mock.
        assert!(matches!(system, Err(Error::Fetch { .. })));

        let mut reader = MockReader::new(Backend::Vasp);
        reader.properties.insert("fermi".into(), 5.5);
        let system = build(reader, &["fermi", "structure"], "energy").unwrap();
        assert!(system.is_locked());
        assert_eq!(system.features().next().unwrap().values, &[5.5]);
    }

    #[test]
    fn appending_to_locked_collection_is_an_error() {
        let plan = Plan {
            inputs: vec![InputStep::Structure, InputStep::Random],
            target: TargetStep::Energy,
            formation_energies: Default::default(),
            seed: Some(1),
        };
        let err = System::assemble(MockReader::new(Backend::Vasp), &files(), &plan).unwrap_err();
        assert!(matches!(err, Error::Locked { input } if input == "random"));
    }

    #[test]
    fn density_then_structure_trains_on_raw_energy() {
        let system = build(MockReader::new(Backend::Qe), &["density", "structure"], "energy")
            .expect("build system");
        assert_eq!(system.target(), -10.5);
        assert!(system.is_locked());
        let names: Vec<_> = system.features().map(|f| f.name).collect();
        assert_eq!(names, vec!["density"]);
    }

    #[test]
    fn user_target_takes_first_element() {
        let reader = MockReader::new(Backend::Vasp);
        let requests = Rc::clone(&reader.requests);
        let system = build(reader, &["density"], "user3").unwrap();
        assert_eq!(system.target(), 4.5);
        assert!(
            requests
                .borrow()
                .contains(&("user3".to_string(), PathBuf::from("user.dat")))
        );
    }

    #[test]
    fn custom_backend_user_target_reads_user_property() {
        let mut reader = MockReader::new(Backend::Custom);
        reader.properties.insert("user".into(), 0.75);
        let requests = Rc::clone(&reader.requests);
        let system = build(reader, &["density"], "user7").unwrap();
        assert_eq!(system.target(), 0.75);
        assert!(
            requests
                .borrow()
                .contains(&("user".to_string(), PathBuf::from("user.dat")))
        );
    }

    #[test]
    fn empty_user_target_is_a_fetch_error() {
        let mut reader = MockReader::new(Backend::Vasp);
        reader.user = vec![Vec::new()];
        let err = build(reader, &["density"], "user1").unwrap_err();
        assert!(matches!(err, Error::Fetch { .. }));
    }

    #[test]
    fn user_inputs_are_stored_by_name() {
        let system = build(MockReader::new(Backend::Vasp), &["user1", "user2"], "energy").unwrap();
        let features: Vec<_> = system.features().collect();
        assert_eq!(features[0].name, "user1");
        assert_eq!(features[0].values, &[1.0, 2.0]);
        assert_eq!(features[1].values, &[3.0]);
    }

    #[test]
    fn gw_gap_and_scalar_targets() {
        let mut reader = MockReader::new(Backend::FhiAims);
        reader.properties.insert("gw_gap".into(), 1.1);
        assert_eq!(build(reader, &["density"], "gw_gap").unwrap().target(), 1.1);

        let mut reader = MockReader::new(Backend::FhiAims);
        reader.properties.insert("fermi".into(), -4.2);
        assert_eq!(build(reader, &["density"], "fermi").unwrap().target(), -4.2);
    }

    #[test]
    fn training_tag_precedence() {
        let system = build(MockReader::new(Backend::Vasp), &["density"], "energy").unwrap();
        assert_eq!(system.train(), "train");

        let with_train = files().with("train", "set-a");
        let system = System::build_with_reader(
            MockReader::new(Backend::Vasp),
            &with_train,
            &FunctionalParams::new(&["density"], "energy"),
        )
        .unwrap();
        assert_eq!(system.train(), "set-a");

        let mut reader = MockReader::new(Backend::Vasp);
        reader.density = Some(grid(2, 1.0).with_train("from-density"));
        reader.structure.train = Some("from-structure".into());
        let system = System::build_with_reader(
            reader,
            &with_train,
            &FunctionalParams::new(&["density", "structure"], "energy"),
        )
        .unwrap();
        assert_eq!(system.train(), "from-structure");
    }

    #[test]
    fn energy_is_locally_corrected() {
        let mut reader = MockReader::new(Backend::Vasp);
        reader.structure.atoms = vec![
            Atom::new(Element::Si, [0.0; 3]),
            Atom::new(Element::Si, [1.3, 1.3, 1.3]),
        ];
        let mut params = FunctionalParams::new(&["density", "structure"], "energy");
        params.formation_energies.insert("Si".into(), -5.0);
        let system = System::build_with_reader(reader, &files(), &params).unwrap();
        assert!(approx_eq(system.target(), -10.5 + 10.0, 1e-12));
    }

    #[test]
    fn structure_references_enable_correction() {
        let mut reader = MockReader::new(Backend::Custom);
        reader.structure.atoms = vec![Atom::new(Element::O, [0.0; 3])];
        reader.structure.formation_energies.insert(Element::O, -4.5);
        let system = build(reader, &["structure"], "energy").unwrap();
        assert!(approx_eq(system.target(), -6.0, 1e-12));
    }

    #[test]
    fn missing_reference_is_a_correction_error() {
        let mut reader = MockReader::new(Backend::Vasp);
        reader.structure.atoms = vec![Atom::new(Element::O, [0.0; 3])];
        let mut params = FunctionalParams::new(&["structure"], "energy");
        params.formation_energies.insert("Si".into(), -5.0);
        let err = System::build_with_reader(reader, &files(), &params).unwrap_err();
        assert!(matches!(err, Error::Correction(_)));
    }

    #[test]
    fn missing_role_is_a_fetch_error() {
        let err = build(MockReader::new(Backend::Vasp), &["volume"], "energy").unwrap_err();
        let Error::Fetch { what, source } = err else {
            panic!("expected fetch error");
        };
        assert_eq!(what, "property 'volume'");
        assert!(matches!(source, io::Error::MissingPath { .. }));
    }

    #[test]
    fn reader_is_released_on_failure() {
        let reader = MockReader::new(Backend::Vasp);
        let dropped = Rc::clone(&reader.dropped);
        assert!(build(reader, &["volume"], "energy").is_err());
        assert!(dropped.get());

        let reader = MockReader::new(Backend::Vasp);
        let dropped = Rc::clone(&reader.dropped);
        assert!(build(reader, &["density"], "energy").is_ok());
        assert!(dropped.get());
    }

    #[test]
    fn seeded_random_is_reproducible() {
        let mut params = FunctionalParams::new(&["random"], "energy");
        params.seed = Some(42);
        let draw = || {
            let reader = MockReader::new(Backend::Vasp);
            let system = System::build_with_reader(reader, &files(), &params).unwrap();
            system.features().next().unwrap().values[0]
        };
        let first = draw();
        assert_eq!(first, draw());
        assert!((0.0..1.0).contains(&first));
    }

    #[test]
    fn backend_selection_uses_code() {
        let params = FunctionalParams::new(&["density"], "energy");
        let err = System::build(&files(), &params).unwrap_err();
        assert!(err.to_string().contains("no 'code' entry"));

        let files = files().with("code", "siesta");
        let err = System::build(&files, &params).unwrap_err();
        assert!(matches!(err, Error::Configuration(msg) if msg.contains("'siesta'")));
    }

    #[test]
    fn example_serializes_features_in_order() {
        let mut reader = MockReader::new(Backend::Vasp);
        reader.properties.insert("fermi".into(), 5.5);
        reader.density = Some(grid(1, 2.0));
        let system = build(reader, &["fermi", "density"], "energy").unwrap();
        let json = serde_json::to_value(system.example()).unwrap();
        assert_eq!(json["features"][0]["name"], "fermi");
        assert_eq!(json["features"][1]["values"][0], 2.0);
        assert_eq!(json["target"], -10.5);
    }

    #[test]
    fn write_cube_emits_both_files() {
        let mut system = build(MockReader::new(Backend::Vasp), &["density"], "energy").unwrap();
        for i in 0..7 {
            system.store_output(i as f64);
        }
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("si");
        let (out_path, in_path) = system.write_cube(&base).unwrap();
        assert!(out_path.to_string_lossy().ends_with(".out.cube"));

        let out = std::fs::read_to_string(&out_path).unwrap();
        let input = std::fs::read_to_string(&in_path).unwrap();
        assert!(out.starts_with(cube::OUTPUT_TITLE));
        assert!(input.starts_with(cube::INPUT_TITLE));
        // Seven header lines, then one full line of values and a partial one.
        assert_eq!(out.lines().count(), 1 + 1 + 1 + 3 + 1 + 2);
        assert_eq!(input.lines().count(), 7 + 64 / 6 + 1);
    }

    #[test]
    fn write_cube_requires_density() {
        let system = build(MockReader::new(Backend::Vasp), &["random"], "energy").unwrap();
        let err = system.write_cube(Path::new("unused")).unwrap_err();
        assert!(matches!(err, Error::MissingDensity));
    }

    #[test]
    fn system_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<System>();
    }
}
