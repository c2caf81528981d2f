mod timeline_walker_tests;
