use criterion::{
    criterion_group, criterion_main, AxisScale, BenchmarkId, Criterion, PlotConfiguration,
    Throughput,
};
use vdsgen::{
    data_type::DataType,
    fill_value::FillValue,
    geometry::{ExcaliburGapFill, Geometry, Reshape},
    node::NodePath,
    source_meta::SourceMeta,
    virtual_dataset::VirtualSource,
};

fn reshape_alternate(c: &mut Criterion) {
    let plot_config = PlotConfiguration::default().summary_scale(AxisScale::Logarithmic);
    let mut group = c.benchmark_group("reshape_alternate");
    group.plot_config(plot_config);

    for new_shape in [vec![5, 2, 10], vec![50, 20, 10], vec![100, 40, 25]] {
        let frames: u64 = new_shape.iter().product();
        let source = VirtualSource::new(
            "scan.h5",
            NodePath::default(),
            vec![frames, 256, 256],
            DataType::UInt16,
        );
        let meta = SourceMeta::new(vec![frames], 256, 256, DataType::UInt16);
        let reshape = Reshape::new(new_shape)
            .unwrap()
            .with_alternate(vec![false, true, true])
            .unwrap();
        group.throughput(Throughput::Elements(frames));
        group.bench_function(BenchmarkId::new("build_layout", frames), |b| {
            b.iter(|| {
                reshape
                    .build_layout(std::slice::from_ref(&source), &meta, FillValue::default())
                    .unwrap()
            });
        });
    }
}

fn excalibur_gap_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("excalibur_gap_fill");
    let geometry = ExcaliburGapFill::new(3, 3, 123).unwrap();
    for frames in [1, 100, 10000] {
        let source = VirtualSource::new(
            "excalibur.h5",
            NodePath::default(),
            vec![frames, 1536, 2048],
            DataType::UInt16,
        );
        let meta = SourceMeta::new(vec![frames], 1536, 2048, DataType::UInt16);
        group.throughput(Throughput::Elements(frames));
        group.bench_function(BenchmarkId::new("build_layout", frames), |b| {
            b.iter(|| {
                geometry
                    .build_layout(std::slice::from_ref(&source), &meta, FillValue::default())
                    .unwrap()
            });
        });
    }
}

criterion_group!(benches, reshape_alternate, excalibur_gap_fill);
criterion_main!(benches);
