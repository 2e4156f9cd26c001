use std::path::PathBuf;

use criterion::{criterion_group, criterion_main, Criterion};
use rhf_core::{
    assemble,
    basis::BasisFunction,
    integrals::{
        compute_kinetic_matrix, compute_overlap_matrix, electron_tensor::ElectronTensor,
        mmd::McMurchieDavidson,
    },
    MoleculeSpec,
};

const INTEGRATOR: McMurchieDavidson = McMurchieDavidson;

struct Instance {
    name: String,
    basis_functions: Vec<BasisFunction>,
}

fn instance(name: &str, symbols: &[&str], coordinates: &[f64], basis_name: &str) -> Instance {
    let database = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../data/basis.json");
    let spec = MoleculeSpec::new(symbols.iter().copied(), coordinates.to_vec());
    let (_, basis) = assemble(&spec, basis_name, 0, database).expect("bundled basis");

    Instance {
        name: format!("{name} {basis_name}"),
        basis_functions: basis.basis_functions(),
    }
}

fn bench_overlap(c: &mut Criterion, instances: &[Instance]) {
    for instance in instances {
        let basis_functions = &instance.basis_functions;

        c.bench_function(&format!("Overlap {}", instance.name), move |b| {
            b.iter(move || compute_overlap_matrix(basis_functions, &INTEGRATOR))
        });
    }
}

fn bench_kinetic(c: &mut Criterion, instances: &[Instance]) {
    for instance in instances {
        let basis_functions = &instance.basis_functions;

        c.bench_function(&format!("Kinetic {}", instance.name), move |b| {
            b.iter(move || compute_kinetic_matrix(basis_functions, &INTEGRATOR))
        });
    }
}

fn bench_electron(c: &mut Criterion, instances: &[Instance]) {
    for instance in instances {
        let basis_functions = &instance.basis_functions;

        c.bench_function(&format!("Electron Repulsion {}", instance.name), move |b| {
            b.iter(move || ElectronTensor::from_basis(basis_functions, &INTEGRATOR))
        });
    }
}

fn bench_integrals(c: &mut Criterion) {
    let hydrogen = [0.0, 0.0, 0.0, 0.0, 0.0, 0.74];
    let water = [0.0, -0.0757, 0.0, 0.866, 0.601, 0.0, -0.866, 0.601, 0.0];

    let instances = [
        instance("hydrogen", &["H", "H"], &hydrogen, "sto-3g"),
        instance("hydrogen", &["H", "H"], &hydrogen, "6-31g"),
        instance("water", &["O", "H", "H"], &water, "sto-3g"),
        instance("water", &["O", "H", "H"], &water, "6-31g"),
    ];

    bench_overlap(c, &instances);
    bench_kinetic(c, &instances);
    bench_electron(c, &instances);
}

criterion_group!(benches, bench_integrals);
criterion_main!(benches);
