//! Init command implementation.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

const DEFAULT_CONFIG: &str = include_str!("../../../apexguide.yml.example");

/// Initialize a new apexguide project
pub fn init_project(path: Option<&Path>) -> Result<()> {
    let root = path.unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(root).with_context(|| format!("Failed to create {:?}", root))?;

    write_config(root)?;
    scaffold_content(root)?;

    println!("✓ apexguide initialized in {:?}", root);
    println!("  - Edit apexguide.yml to customize site metadata");
    println!("  - Write topics in content/<section>/<slug>.md");
    Ok(())
}

fn write_config(root: &Path) -> Result<()> {
    let config_path = root.join("apexguide.yml");
    if config_path.exists() {
        println!("apexguide.yml already exists at {:?}", config_path);
        return Ok(());
    }

    fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {:?}", config_path))?;
    println!("Created {:?}", config_path);
    Ok(())
}

fn scaffold_content(root: &Path) -> Result<()> {
    let apex = root.join("content").join("apex");
    fs::create_dir_all(&apex).with_context(|| format!("Failed to create {:?}", apex))?;

    for (name, body) in [("intro.md", SAMPLE_INTRO), ("loops.md", SAMPLE_LOOPS)] {
        let sample = apex.join(name);
        if !sample.exists() {
            fs::write(&sample, body).with_context(|| format!("Failed to write {:?}", sample))?;
            println!("Created {:?}", sample);
        }
    }
    Ok(())
}

const SAMPLE_INTRO: &str = r#"---
title: Introduction to Apex
description: What Apex is and where it runs
order: 1
difficulty: beginner
concepts: [classes, governor limits]
relatedTopics: [loops]
examWeight: high
---

## What is Apex

Apex is a strongly typed, object-oriented language that runs on the platform's servers.

## Hello world

```apex
public class Greeter {
    public static String greet(String name) {
        return 'Hello, ' + name;
    }
}
```

Run `apexguide build` to render this topic, or `apexguide dev` to preview it.
"#;

const SAMPLE_LOOPS: &str = r#"---
title: Loops
description: Iterating over lists and query results
order: 2
difficulty: beginner
prerequisites: [intro]
---

## For loops

```apex
for (Account acc : [SELECT Id, Name FROM Account LIMIT 10]) {
    System.debug(acc.Name);
}
```

### Bulk-safe iteration

Keep queries and DML out of loop bodies.
"#;
