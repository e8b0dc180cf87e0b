use std::{
    env,
    fs::File,
    path::{Path, PathBuf},
    process,
};

use jcp_class_file::{ClassFile, ClassFileError};
use memmap::Mmap;

const CLASS_VAR: &str = "JCP_CLASS";

fn main() {
    pretty_env_logger::init();

    let Some(path) = class_path() else {
        log::error!("Usage: jcp <file.class> (or set {})", CLASS_VAR);
        process::exit(2);
    };

    if let Err(e) = dump(&path) {
        log::error!("{}: {}", path.display(), e);
        process::exit(1);
    }
}

fn class_path() -> Option<PathBuf> {
    env::args_os()
        .nth(1)
        .or_else(|| env::var_os(CLASS_VAR))
        .map(PathBuf::from)
}

fn dump(path: &Path) -> Result<(), ClassFileError> {
    let file = File::open(path)?;
    // SAFETY: the mapping is read-only and dropped before returning.
    let mmap = unsafe { Mmap::map(&file)? };
    log::debug!("Mapped {} bytes from {}", mmap.len(), path.display());

    let class_file = ClassFile::parse(&mmap)?;
    let constant_pool = &class_file.constant_pool;
    log::info!(
        "Decoded {} constant pool entries ({} slots)",
        constant_pool.iter().count(),
        constant_pool.count().saturating_sub(1)
    );

    println!("Class:       {}", class_file.class_name()?);
    match class_file.super_class()? {
        Some(super_class) => println!("Super class: {}", super_class),
        None => println!("Super class: (none)"),
    }
    for interface in class_file.interface_names()? {
        println!("Interface:   {}", interface);
    }
    println!(
        "Version:     {}.{}",
        class_file.version.0, class_file.version.1
    );
    println!("Flags:       {:?}", class_file.access_flags);
    println!();

    println!("Constant pool:");
    for (index, cp_info) in constant_pool {
        println!("{:>6} = {}", format!("#{}", index), cp_info);
    }
    println!();

    for method in &class_file.methods {
        let name = class_file.method_name(method)?;
        let descriptor = class_file.method_descriptor(method)?;
        match method.attributes.code_attribute(constant_pool)? {
            Some(code) => println!(
                "{}{}: {} bytes of code, max_stack={}, max_locals={}",
                name,
                descriptor,
                code.code.len(),
                code.max_stack,
                code.max_locals
            ),
            None => {
                log::debug!("Method {}{} has no Code attribute", name, descriptor);
                println!("{}{}: no code", name, descriptor);
            }
        }
    }

    Ok(())
}
