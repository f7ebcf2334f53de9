fn main() {
    hair_shadows::run();
}
