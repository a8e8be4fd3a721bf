use std::path::Path;

use aether::{
    common::{Manifest, Source},
    construct::tree::IrBlock,
    Session,
};

use crate::status::Status;

fn read(path: &Path) -> Result<std::rc::Rc<Source>, String> {
    Source::path(path).map_err(|e| format!("Could not read `{}`: {}", path.display(), e))
}

fn print_ir(ir: &IrBlock) {
    for expr in ir {
        println!("{}", expr);
    }
}

pub fn lex(path: &Path) -> Result<(), String> {
    let tokens = Session::new()
        .lex(read(path)?)
        .map_err(|e| e.to_string())?;

    for token in tokens.item.iter() {
        println!("{}", token);
    }

    Ok(())
}

pub fn parse(path: &Path) -> Result<(), String> {
    let ir = Session::new()
        .compile(read(path)?)
        .map_err(|e| e.to_string())?;

    print_ir(&ir);
    Ok(())
}

pub fn build(path: &Path) -> Result<(), String> {
    let (manifest, root) = Manifest::package(path)?;
    let entry = manifest.entry(root);

    let source = read(&entry).map_err(|_| {
        format!(
            "Could not find source entrypoint `{}`",
            manifest.package.entry.display()
        )
    })?;

    let ir = Session::new()
        .with_config(manifest.compiler.clone())
        .compile(source)
        .map_err(|e| e.to_string())?;

    print_ir(&ir);
    Status::success().log(&format!(
        "Built {} v{}",
        manifest.package.name, manifest.package.version
    ));
    Ok(())
}
