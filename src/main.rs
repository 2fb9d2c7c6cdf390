fn main() {
    recipe_lookup::run()
}
