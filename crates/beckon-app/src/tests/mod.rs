mod gesture_loop_tests;
