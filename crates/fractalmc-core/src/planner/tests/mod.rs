mod resources_tests;
