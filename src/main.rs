#[cfg(target_arch = "wasm32")]
fn main() {
    ninja_quest::wasm::mount();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use ninja_quest::Catalog;

    let catalog = match Catalog::builtin() {
        Ok(catalog) => catalog,
        Err(error) => {
            eprintln!("chapter content failed to load: {error}");
            std::process::exit(1);
        }
    };

    println!(
        "Injective Ninja Quest: {} chapters, {} questions, {} points available",
        catalog.len(),
        catalog.question_count(),
        catalog.max_total_score()
    );
    for chapter in catalog.chapters() {
        println!(
            "  {}. {} ({} questions, up to {} points)",
            chapter.id,
            chapter.title,
            chapter.questions.len(),
            chapter.max_score()
        );
    }
    println!("The quest runs in the browser: build it with `trunk serve`.");
}
