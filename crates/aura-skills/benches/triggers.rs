use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use aura_skills::{RegistryConfig, SkillRegistry};

fn registry_with_skills(dir: &std::path::Path, count: usize) -> SkillRegistry {
    let core = dir.join("core");
    for i in 0..count {
        let skill_dir = core.join(format!("skill-{i:03}"));
        std::fs::create_dir_all(&skill_dir).unwrap();
        std::fs::write(
            skill_dir.join("SKILL.md"),
            format!(
                "---\nname: skill-{i:03}\npriority: {}\ntriggers:\n  - keyword {i}\n  - phrase number {i} here\n---\nbody",
                i % 10
            ),
        )
        .unwrap();
    }

    let mut config = RegistryConfig::new(dir);
    config.lockfile_path = dir.join("skills.lock.json");
    let mut registry = SkillRegistry::new(config);
    registry.load().unwrap();
    registry
}

fn match_triggers_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("match_triggers");

    for count in [10, 50, 200] {
        let dir = tempfile::tempdir().unwrap();
        let registry = registry_with_skills(dir.path(), count);
        let message = format!("please run phrase number {} here for me", count - 1);

        group.bench_with_input(BenchmarkId::new("skills", count), &count, |b, _| {
            b.iter(|| black_box(registry.match_triggers(black_box(&message))));
        });
    }

    group.finish();
}

criterion_group!(benches, match_triggers_bench);
criterion_main!(benches);
