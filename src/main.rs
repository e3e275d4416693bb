fn main() {
    medintake_lib::run()
}
